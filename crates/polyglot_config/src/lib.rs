//! Parsing and validation of `polyglot.toml` repository configuration.
//!
//! The file is optional. When present at the root of the work tree it tunes
//! the scan (tree-size cap, incremental mode) and names the cache file. CLI
//! flags are layered on top by [`resolve_settings`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{resolve_settings, Overrides, ResolvedSettings};
pub use types::*;
