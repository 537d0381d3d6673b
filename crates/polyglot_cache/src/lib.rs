//! Incremental, per-repository cache of commit language statistics.
//!
//! One cache file per repository holds the statistics of the last commit
//! scanned. [`StatsCache`] decides on every request whether to return a
//! frozen result, extend the cached baseline incrementally, or rescan the
//! whole tree, and writes the new result back atomically.

#![warn(missing_docs)]

pub mod codec;
pub mod controller;
pub mod error;
pub mod record;
pub mod store;

pub use codec::{decode, encode};
pub use controller::{ScanMode, StatsCache};
pub use error::{CacheError, DecodeError};
pub use record::{cache_version, CacheRecord, CacheState, CACHE_SCHEMA};
pub use store::CacheStore;
