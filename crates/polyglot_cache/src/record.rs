//! The persisted cache record and its classification against the running
//! version.

use polyglot_common::{LanguageStats, ObjectId};
use polyglot_stats::CommitStats;
use serde::{Deserialize, Serialize};

/// Schema tag of the record layout. Bump when [`CacheRecord`] changes shape.
pub const CACHE_SCHEMA: &str = "polyglot-cache-v1";

/// Builds the version string stored in every record: the schema tag plus
/// the classifier's version, so that either changing invalidates old caches.
pub fn cache_version(classifier_version: &str) -> String {
    format!("{CACHE_SCHEMA}+{classifier_version}")
}

/// What is stored in the cache file: the statistics of one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Schema and classifier version that produced the record.
    pub version: String,
    /// The commit the statistics describe, or [`ObjectId::NULL`] if frozen.
    pub commit: ObjectId,
    /// Language weights of the commit.
    pub stats: LanguageStats,
    /// Regular files in the commit's tree, or `None` when unknown (the tree
    /// exceeded the file cap, or the record is the frozen marker).
    pub file_count: Option<u64>,
}

impl CacheRecord {
    /// Creates a record for a computed commit whose tree size is unknown.
    pub fn new(version: impl Into<String>, commit: ObjectId, stats: LanguageStats) -> Self {
        Self {
            version: version.into(),
            commit,
            stats,
            file_count: None,
        }
    }

    /// Creates a record from a provider result.
    pub fn computed(version: impl Into<String>, commit: ObjectId, computed: CommitStats) -> Self {
        Self {
            file_count: computed.file_count,
            ..Self::new(version, commit, computed.stats)
        }
    }

    /// Creates the frozen marker: null commit, empty statistics.
    pub fn frozen(version: impl Into<String>) -> Self {
        Self::new(version, ObjectId::NULL, LanguageStats::new())
    }

    /// Returns `true` if this record freezes the cache.
    pub fn is_frozen(&self) -> bool {
        self.commit.is_null()
    }
}

/// The cache as seen by the controller before it decides what to compute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    /// No file, an unreadable file, or a file that failed to decode.
    Absent,
    /// A valid record written by a different schema or classifier version.
    Stale {
        /// The version found in the record.
        version: String,
    },
    /// Recomputation is disabled; these statistics are returned as-is.
    Frozen {
        /// The frozen statistics (normally empty).
        stats: LanguageStats,
    },
    /// A usable baseline for an incremental scan.
    Baseline {
        /// The commit the cached statistics describe.
        commit: ObjectId,
        /// The cached statistics and tree size.
        base: CommitStats,
    },
}

impl CacheState {
    /// Classifies a decoded record (or its absence) against the running
    /// version. A version mismatch wins over the frozen marker.
    pub fn classify(record: Option<CacheRecord>, current_version: &str) -> Self {
        match record {
            None => CacheState::Absent,
            Some(r) if r.version != current_version => CacheState::Stale { version: r.version },
            Some(r) if r.is_frozen() => CacheState::Frozen { stats: r.stats },
            Some(r) => CacheState::Baseline {
                commit: r.commit,
                base: CommitStats {
                    stats: r.stats,
                    file_count: r.file_count,
                },
            },
        }
    }
}
