//! `polyglot dump-cache`, `clear` and `disable`.

use polyglot_config::Overrides;
use polyglot_stats::ExtensionClassifier;

use crate::error::CliError;
use crate::workspace::Workspace;
use crate::{print_json, GlobalArgs};

/// Prints the cache record as JSON, or `null` when there is no cache file.
pub fn dump(global: &GlobalArgs) -> Result<i32, CliError> {
    let workspace = Workspace::open(global, &Overrides::default())?;
    let record = workspace.cache(&ExtensionClassifier::new()).dump()?;
    print_json(&record)?;
    Ok(0)
}

/// Deletes the cache file.
pub fn clear(global: &GlobalArgs) -> Result<i32, CliError> {
    let workspace = Workspace::open(global, &Overrides::default())?;
    let cache = workspace.cache(&ExtensionClassifier::new());
    let removed = cache.clear()?;
    if !global.quiet {
        let path = cache.store().path().display();
        if removed {
            eprintln!("  Removed {path}");
        } else {
            eprintln!("  No cache at {path}");
        }
    }
    Ok(0)
}

/// Freezes the cache at empty statistics.
pub fn disable(global: &GlobalArgs) -> Result<i32, CliError> {
    let workspace = Workspace::open(global, &Overrides::default())?;
    let cache = workspace.cache(&ExtensionClassifier::new());
    cache.disable()?;
    if !global.quiet {
        eprintln!("  Disabled {}", cache.store().path().display());
    }
    Ok(0)
}
