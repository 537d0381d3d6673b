//! Error types for repository access and statistics computation.

use std::path::PathBuf;

use polyglot_common::{ObjectId, StatsUnderflow};

/// Errors raised while reading a repository or computing statistics.
///
/// Three variants describe a bad cached baseline rather than a bad request
/// (see [`StatsError::is_baseline_error`]). Callers holding a cache recover
/// from those by recomputing from scratch; every other variant is fatal.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// The path is not inside a git repository.
    #[error("not a git repository: {path}")]
    NotARepository {
        /// The path that was searched from.
        path: PathBuf,
        /// The underlying git error.
        source: git2::Error,
    },

    /// A revision expression did not resolve to a commit.
    #[error("revision '{rev}' does not name a commit")]
    RevisionNotFound {
        /// The revision as given by the user.
        rev: String,
    },

    /// A commit id is not present in the repository.
    #[error("commit {0} not found")]
    CommitNotFound(ObjectId),

    /// A blob id is not present in the repository.
    #[error("blob {0} not found")]
    BlobNotFound(ObjectId),

    /// The repository uses object ids polyglot cannot represent.
    #[error("unsupported object id {0} (only 20-byte SHA-1 ids are supported)")]
    UnsupportedObjectId(String),

    /// The cached baseline commit no longer exists in the repository.
    #[error("baseline commit {0} is not available")]
    BaselineUnavailable(ObjectId),

    /// The cached baseline statistics do not match the baseline commit.
    #[error("cached baseline is inconsistent: {0}")]
    InconsistentBaseline(#[from] StatsUnderflow),

    /// The cached baseline records fewer files than the diff removes.
    #[error("cached baseline records {recorded} files but the diff removes {removed}")]
    InconsistentFileCount {
        /// File count stored with the baseline.
        recorded: u64,
        /// Files the diff removes from the baseline tree.
        removed: u64,
    },

    /// Any other libgit2 failure.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}

impl StatsError {
    /// Returns `true` if the error was caused by the cached baseline passed
    /// to an incremental computation, not by the requested commit.
    pub fn is_baseline_error(&self) -> bool {
        matches!(
            self,
            StatsError::BaselineUnavailable(_)
                | StatsError::InconsistentBaseline(_)
                | StatsError::InconsistentFileCount { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_errors_are_recoverable() {
        let underflow = StatsUnderflow {
            language: "Ruby".to_string(),
            available: 1,
            requested: 2,
        };
        assert!(StatsError::InconsistentBaseline(underflow).is_baseline_error());
        assert!(StatsError::BaselineUnavailable(ObjectId::NULL).is_baseline_error());
        assert!(StatsError::InconsistentFileCount {
            recorded: 1,
            removed: 3
        }
        .is_baseline_error());
    }

    #[test]
    fn request_errors_are_fatal() {
        assert!(!StatsError::CommitNotFound(ObjectId::NULL).is_baseline_error());
        assert!(!StatsError::RevisionNotFound {
            rev: "nope".to_string()
        }
        .is_baseline_error());
    }

    #[test]
    fn revision_display() {
        let err = StatsError::RevisionNotFound {
            rev: "feature/x".to_string(),
        };
        assert_eq!(err.to_string(), "revision 'feature/x' does not name a commit");
    }

    #[test]
    fn inconsistent_baseline_display_names_language() {
        let err = StatsError::from(StatsUnderflow {
            language: "Go".to_string(),
            available: 3,
            requested: 9,
        });
        let msg = err.to_string();
        assert!(msg.contains("inconsistent"));
        assert!(msg.contains("'Go'"));
    }
}
