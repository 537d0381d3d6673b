//! Configuration types deserialized from `polyglot.toml`.

use serde::Deserialize;

/// Default cap on the number of files considered in one tree.
pub const DEFAULT_MAX_TREE_SIZE: usize = 100_000;

/// Default name of the cache file inside the repository's git directory.
pub const DEFAULT_CACHE_FILE: &str = "polyglot-cache";

/// The top-level configuration parsed from `polyglot.toml`.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PolyglotConfig {
    /// Tree scanning settings.
    #[serde(default)]
    pub scan: ScanConfig,
    /// Cache file settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Tree scanning settings.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Maximum number of files classified per tree. Files past the cap are
    /// ignored.
    #[serde(default = "default_max_tree_size")]
    pub max_tree_size: usize,
    /// Whether a cached baseline may be extended incrementally. `false`
    /// forces a full scan on every run.
    #[serde(default = "default_true")]
    pub incremental: bool,
}

/// Cache file settings.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// File name of the cache inside the git directory.
    #[serde(default = "default_cache_file")]
    pub file_name: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_tree_size: DEFAULT_MAX_TREE_SIZE,
            incremental: true,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_CACHE_FILE.to_string(),
        }
    }
}

fn default_max_tree_size() -> usize {
    DEFAULT_MAX_TREE_SIZE
}

fn default_true() -> bool {
    true
}

fn default_cache_file() -> String {
    DEFAULT_CACHE_FILE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn partial_scan_section_keeps_other_defaults() {
        let config = load_config_from_str("[scan]\nincremental = false\n").unwrap();
        assert!(!config.scan.incremental);
        assert_eq!(config.scan.max_tree_size, DEFAULT_MAX_TREE_SIZE);
        assert_eq!(config.cache.file_name, DEFAULT_CACHE_FILE);
    }

    #[test]
    fn default_matches_empty_file() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, PolyglotConfig::default());
    }
}
