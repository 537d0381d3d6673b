//! Fatal errors of a `polyglot` invocation.

use polyglot_cache::{CacheError, DecodeError};
use polyglot_config::ConfigError;
use polyglot_stats::StatsError;

/// Anything that ends an invocation with exit code 1.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A required argument was missing or unusable.
    #[error("{0}")]
    Usage(String),

    /// `polyglot.toml` or a flag value was rejected.
    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    /// The repository could not be read or the statistics computed.
    #[error(transparent)]
    Stats(#[from] StatsError),

    /// The cache file could not be written or removed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The cache file exists but cannot be decoded.
    #[error("cache file is unreadable")]
    CorruptCache(#[from] DecodeError),

    /// The result could not be rendered as JSON.
    #[error("failed to render JSON output")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Renders the error and its source chain, one cause per line.
    pub fn report(&self) -> String {
        let mut out = format!("error: {self}");
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str(&format!("\n  caused by: {cause}"));
            source = cause.source();
        }
        out
    }
}
