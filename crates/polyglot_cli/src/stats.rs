//! `polyglot stats`: language statistics of one commit, through the cache.

use polyglot_cache::{CacheState, ScanMode};
use polyglot_config::Overrides;
use polyglot_stats::{ExtensionClassifier, RepoAccess, StatsEngine};

use crate::error::CliError;
use crate::workspace::Workspace;
use crate::{print_json, required_commit, GlobalArgs, StatsArgs};

/// Runs the `polyglot stats` command and prints `{language: weight}`.
///
/// A frozen cache answers for every commit, so the revision is only
/// resolved once the cache is known not to be frozen.
pub fn run(args: &StatsArgs, global: &GlobalArgs) -> Result<i32, CliError> {
    let rev = required_commit(args.commit.as_deref())?;
    let overrides = Overrides {
        max_tree_size: args.max_tree_size,
        force_full: args.force,
    };
    let workspace = Workspace::open(global, &overrides)?;
    let classifier = ExtensionClassifier::new();
    let cache = workspace.cache(&classifier);
    if let CacheState::Frozen { stats } = cache.state() {
        print_json(&stats)?;
        return Ok(0);
    }

    let commit = workspace.repo.resolve(rev)?;
    let mode = ScanMode::from_incremental(workspace.settings.incremental);
    let engine = StatsEngine::new(
        workspace.repo,
        classifier,
        workspace.settings.max_tree_size,
    );

    let stats = cache.compute(&engine, commit, mode)?;
    print_json(&stats)?;
    Ok(0)
}
