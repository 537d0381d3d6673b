//! Language statistics for git commits.
//!
//! The [`StatsEngine`] walks a commit's tree through a [`RepoAccess`]
//! implementation and classifies each file with a [`Classifier`]. It can also
//! derive a commit's statistics from a baseline commit's statistics by
//! reclassifying only the files that differ between the two trees.

#![warn(missing_docs)]

pub mod classify;
pub mod engine;
pub mod error;
pub mod git;
pub mod memory;
pub mod repo;

pub use classify::{Classification, Classifier, ExtensionClassifier};
pub use engine::{CommitStats, FileBreakdown, StatsEngine, StatsProvider};
pub use error::StatsError;
pub use git::GitRepository;
pub use memory::MemoryRepository;
pub use repo::{FileChange, FileEntry, RepoAccess, TreeListing};
