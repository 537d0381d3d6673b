//! Shared foundational types used across the polyglot workspace.
//!
//! This crate provides git object identifiers (including the reserved null
//! commit), the per-language weight mapping produced by a scan, content
//! checksums for cache framing.

#![warn(missing_docs)]

pub mod hash;
pub mod object_id;
pub mod stats;

pub use hash::ContentHash;
pub use object_id::{ObjectId, ParseObjectIdError};
pub use stats::{LanguageStats, StatsUnderflow};
