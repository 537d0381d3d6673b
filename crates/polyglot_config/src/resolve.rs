//! Settings resolution: layering command-line flags over the config file.

use crate::error::ConfigError;
use crate::types::PolyglotConfig;

/// Per-invocation overrides supplied on the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    /// `--max-tree-size`, if given.
    pub max_tree_size: Option<usize>,
    /// `--force`: ignore any cached baseline.
    pub force_full: bool,
}

/// The effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    /// Maximum number of files classified per tree.
    pub max_tree_size: usize,
    /// Whether a cached baseline may be extended incrementally.
    pub incremental: bool,
    /// Cache file name inside the git directory.
    pub cache_file: String,
}

/// Merges the configuration file with command-line overrides.
///
/// Flags win over the file. `--force` can only turn incremental mode off,
/// never on.
pub fn resolve_settings(
    config: &PolyglotConfig,
    overrides: &Overrides,
) -> Result<ResolvedSettings, ConfigError> {
    let max_tree_size = overrides
        .max_tree_size
        .unwrap_or(config.scan.max_tree_size);
    if max_tree_size == 0 {
        return Err(ConfigError::ValidationError(
            "--max-tree-size must be positive".to_string(),
        ));
    }

    Ok(ResolvedSettings {
        max_tree_size,
        incremental: config.scan.incremental && !overrides.force_full,
        cache_file: config.cache.file_name.clone(),
    })
}
