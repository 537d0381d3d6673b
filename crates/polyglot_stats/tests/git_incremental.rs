//! Incremental scans over a real git history must match full scans.

use std::path::Path;

use git2::{Oid, Repository, Signature};
use polyglot_common::ObjectId;
use polyglot_stats::{ExtensionClassifier, GitRepository, RepoAccess, StatsEngine};

/// Commits the work tree as it is on disk (all files, deletions included).
fn commit_all(repo: &Repository, message: &str) -> Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.update_all(["*"].iter(), None).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::now("Test", "test@example.com").unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

fn write(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    std::fs::create_dir_all(full.parent().unwrap()).unwrap();
    std::fs::write(full, content).unwrap();
}

fn id(oid: Oid) -> ObjectId {
    ObjectId::from_slice(oid.as_bytes()).unwrap()
}

#[test]
fn incremental_matches_full_across_history() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let repo = Repository::init(root).unwrap();

    write(root, "app/models/user.rb", "class User\nend\n");
    write(root, "app/models/post.rb", "class Post\nend\n");
    write(root, "web/index.js", "console.log('hi');\n");
    write(root, "README.md", "# readme\n");
    let c1 = commit_all(&repo, "initial");

    write(root, "tools/report.py", "print('report')\n");
    write(root, "app/models/user.rb", "class User\n  def name; end\nend\n");
    let c2 = commit_all(&repo, "add python, edit ruby");

    std::fs::remove_file(root.join("web/index.js")).unwrap();
    write(root, "vendor/lib.rb", "# vendored, not counted\n");
    write(root, "bin/deploy", "#!/usr/bin/env bash\necho deploy\n");
    let c3 = commit_all(&repo, "drop js, add script");

    let engine = StatsEngine::new(
        GitRepository::from_repository(repo),
        ExtensionClassifier::new(),
        10_000,
    );
    let (c1, c2, c3) = (id(c1), id(c2), id(c3));

    let full1 = engine.compute_full(c1).unwrap();
    assert!(full1.stats.get("Ruby") > 0);
    assert!(full1.stats.get("JavaScript") > 0);

    let inc2 = engine.compute_incremental(c2, c1, full1.clone()).unwrap();
    assert_eq!(inc2, engine.compute_full(c2).unwrap());
    assert!(inc2.stats.get("Python") > 0);

    let inc3 = engine.compute_incremental(c3, c2, inc2).unwrap();
    let full3 = engine.compute_full(c3).unwrap();
    assert_eq!(inc3, full3);
    assert_eq!(full3.stats.get("JavaScript"), 0);
    assert!(full3.stats.get("Shell") > 0);

    assert_eq!(full3.file_count, Some(6));

    let jumped = engine.compute_incremental(c3, c1, full1).unwrap();
    assert_eq!(jumped, full3);
}

#[test]
fn resolves_branch_names() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    write(dir.path(), "main.rs", "fn main() {}\n");
    let c1 = commit_all(&repo, "initial");
    let head = repo.head().unwrap();
    let branch = head.shorthand().unwrap().to_string();
    drop(head);

    let git = GitRepository::from_repository(repo);
    assert_eq!(git.resolve(&branch).unwrap(), id(c1));
    assert_eq!(git.resolve("HEAD").unwrap(), id(c1));
}
