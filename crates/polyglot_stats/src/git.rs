//! [`RepoAccess`] over libgit2.

use std::path::Path;

use git2::{Delta, DiffFile, FileMode, ObjectType, Oid, Repository, Tree};
use polyglot_common::ObjectId;
use tracing::debug;

use crate::error::StatsError;
use crate::repo::{FileChange, FileEntry, RepoAccess, TreeListing};

/// Tree-entry modes counted as regular files (plain and executable).
const REGULAR_MODES: [i32; 2] = [0o100644, 0o100755];

/// A git repository opened through libgit2.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Finds the repository containing `path`, searching parent directories.
    pub fn discover(path: &Path) -> Result<Self, StatsError> {
        let repo = Repository::discover(path).map_err(|source| StatsError::NotARepository {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(git_dir = %repo.path().display(), "opened repository");
        Ok(Self { repo })
    }

    /// Wraps an already opened repository.
    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    /// The `.git` directory (or the repository itself when bare). The cache
    /// file lives here.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// The work tree root, if the repository is not bare.
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    fn find_tree(&self, commit: ObjectId) -> Result<Tree<'_>, StatsError> {
        let commit = self
            .repo
            .find_commit(to_oid(commit)?)
            .map_err(|_| StatsError::CommitNotFound(commit))?;
        Ok(commit.tree()?)
    }

    /// Appends the regular files under `tree` to `listing` in pre-order,
    /// stopping once `limit` files are collected and another one is seen.
    ///
    /// Entries whose names are not UTF-8 are skipped, subtrees included,
    /// the same way `diff` skips them.
    fn collect_files(
        &self,
        tree: &Tree<'_>,
        prefix: &str,
        limit: usize,
        listing: &mut TreeListing,
    ) -> Result<(), StatsError> {
        for entry in tree.iter() {
            let Ok(name) = std::str::from_utf8(entry.name_bytes()) else {
                continue;
            };
            match entry.kind() {
                Some(ObjectType::Tree) => {
                    let subtree = self.repo.find_tree(entry.id())?;
                    self.collect_files(&subtree, &format!("{prefix}{name}/"), limit, listing)?;
                }
                Some(ObjectType::Blob) if REGULAR_MODES.contains(&entry.filemode()) => {
                    if listing.files.len() == limit {
                        listing.truncated = true;
                    } else {
                        listing.files.push(FileEntry {
                            path: format!("{prefix}{name}"),
                            blob: from_oid(entry.id())?,
                        });
                    }
                }
                _ => {}
            }
            if listing.truncated {
                break;
            }
        }
        Ok(())
    }
}

impl RepoAccess for GitRepository {
    fn resolve(&self, rev: &str) -> Result<ObjectId, StatsError> {
        let not_found = || StatsError::RevisionNotFound {
            rev: rev.to_string(),
        };
        let commit = self
            .repo
            .revparse_single(rev)
            .map_err(|_| not_found())?
            .peel_to_commit()
            .map_err(|_| not_found())?;
        from_oid(commit.id())
    }

    fn contains_commit(&self, commit: ObjectId) -> bool {
        match to_oid(commit) {
            Ok(oid) => self.repo.find_commit(oid).is_ok(),
            Err(_) => false,
        }
    }

    fn list_files(&self, commit: ObjectId, limit: usize) -> Result<TreeListing, StatsError> {
        let tree = self.find_tree(commit)?;
        let mut listing = TreeListing::default();
        self.collect_files(&tree, "", limit, &mut listing)?;
        Ok(listing)
    }

    fn diff(&self, from: ObjectId, to: ObjectId) -> Result<Vec<FileChange>, StatsError> {
        let old_tree = self.find_tree(from)?;
        let new_tree = self.find_tree(to)?;
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)?;

        let mut changes = Vec::with_capacity(diff.deltas().len());
        for delta in diff.deltas() {
            let status = delta.status();
            let old = if status == Delta::Added {
                None
            } else {
                regular_file(&delta.old_file())?
            };
            let new = if status == Delta::Deleted {
                None
            } else {
                regular_file(&delta.new_file())?
            };
            if let Some(change) = FileChange::from_sides(old, new) {
                changes.push(change);
            }
        }
        Ok(changes)
    }

    fn read_blob(&self, blob: ObjectId) -> Result<Vec<u8>, StatsError> {
        let found = self
            .repo
            .find_blob(to_oid(blob)?)
            .map_err(|_| StatsError::BlobNotFound(blob))?;
        Ok(found.content().to_vec())
    }
}

/// Returns the delta side as a [`FileEntry`] if it is a regular file.
fn regular_file(file: &DiffFile<'_>) -> Result<Option<FileEntry>, StatsError> {
    if !matches!(file.mode(), FileMode::Blob | FileMode::BlobExecutable) {
        return Ok(None);
    }
    let Some(path) = file.path().and_then(|p| p.to_str()) else {
        return Ok(None);
    };
    Ok(Some(FileEntry {
        path: path.replace('\\', "/"),
        blob: from_oid(file.id())?,
    }))
}

fn to_oid(id: ObjectId) -> Result<Oid, StatsError> {
    Ok(Oid::from_bytes(id.as_bytes())?)
}

fn from_oid(oid: Oid) -> Result<ObjectId, StatsError> {
    ObjectId::from_slice(oid.as_bytes())
        .ok_or_else(|| StatsError::UnsupportedObjectId(oid.to_string()))
}
