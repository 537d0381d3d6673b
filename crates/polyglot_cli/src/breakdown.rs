//! `polyglot breakdown`: which files make up each language.

use polyglot_config::Overrides;
use polyglot_stats::{ExtensionClassifier, RepoAccess, StatsEngine};

use crate::error::CliError;
use crate::workspace::Workspace;
use crate::{print_json, required_commit, BreakdownArgs, GlobalArgs};

/// Runs the `polyglot breakdown` command. Always scans the full tree and
/// never touches the cache.
pub fn run(args: &BreakdownArgs, global: &GlobalArgs) -> Result<i32, CliError> {
    let rev = required_commit(args.commit.as_deref())?;
    let overrides = Overrides {
        max_tree_size: args.max_tree_size,
        force_full: true,
    };
    let workspace = Workspace::open(global, &overrides)?;
    let commit = workspace.repo.resolve(rev)?;

    let engine = StatsEngine::new(
        workspace.repo,
        ExtensionClassifier::new(),
        workspace.settings.max_tree_size,
    );
    print_json(&engine.breakdown(commit)?)?;
    Ok(0)
}
