//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::PolyglotConfig;
use std::path::Path;

/// Name of the configuration file at the root of the work tree.
pub const CONFIG_FILE: &str = "polyglot.toml";

/// Loads and validates `polyglot.toml` from a repository work tree.
///
/// A missing file is not an error: the defaults are returned instead.
pub fn load_config(root: &Path) -> Result<PolyglotConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    let content = match std::fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(PolyglotConfig::default())
        }
        Err(e) => return Err(e.into()),
    };
    load_config_from_str(&content)
}

/// Parses and validates a `polyglot.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<PolyglotConfig, ConfigError> {
    let config: PolyglotConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Rejects values that would make the scan or the cache path meaningless.
fn validate_config(config: &PolyglotConfig) -> Result<(), ConfigError> {
    if config.scan.max_tree_size == 0 {
        return Err(ConfigError::ValidationError(
            "scan.max_tree_size must be positive".to_string(),
        ));
    }
    let name = &config.cache.file_name;
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ConfigError::ValidationError(format!(
            "cache.file_name '{name}' must be a plain file name"
        )));
    }
    Ok(())
}
