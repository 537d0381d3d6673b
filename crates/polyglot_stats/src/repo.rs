//! The repository access boundary.

use polyglot_common::ObjectId;

use crate::error::StatsError;

/// A regular file in a commit's tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Slash-separated path relative to the tree root.
    pub path: String,
    /// Id of the file's blob.
    pub blob: ObjectId,
}

/// Files of one tree, in tree-walk order, capped at a limit.
#[derive(Debug, Clone, Default)]
pub struct TreeListing {
    /// The first `limit` regular files of the tree.
    pub files: Vec<FileEntry>,
    /// `true` if the tree holds more regular files than the limit.
    pub truncated: bool,
}

/// One regular-file difference between two trees.
///
/// A rename is reported as a removal plus an addition. A path that changes
/// between a regular file and a symlink or submodule appears only on its
/// regular-file side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// The file exists only in the newer tree.
    Added(FileEntry),
    /// The file exists only in the older tree.
    Removed(FileEntry),
    /// The file exists in both trees with different content.
    Modified {
        /// The file in the older tree.
        old: FileEntry,
        /// The file in the newer tree.
        new: FileEntry,
    },
}

impl FileChange {
    /// Builds a change from the regular-file sides of a delta. Returns `None`
    /// when neither side is a regular file.
    pub fn from_sides(old: Option<FileEntry>, new: Option<FileEntry>) -> Option<Self> {
        match (old, new) {
            (Some(old), Some(new)) => Some(FileChange::Modified { old, new }),
            (Some(old), None) => Some(FileChange::Removed(old)),
            (None, Some(new)) => Some(FileChange::Added(new)),
            (None, None) => None,
        }
    }

    /// The file as it was before the change, if it existed.
    pub fn before(&self) -> Option<&FileEntry> {
        match self {
            FileChange::Removed(old) | FileChange::Modified { old, .. } => Some(old),
            FileChange::Added(_) => None,
        }
    }

    /// The file as it is after the change, if it still exists.
    pub fn after(&self) -> Option<&FileEntry> {
        match self {
            FileChange::Added(new) | FileChange::Modified { new, .. } => Some(new),
            FileChange::Removed(_) => None,
        }
    }
}

/// Read-only access to a repository's commits, trees, and blobs.
///
/// Implemented over libgit2 by [`GitRepository`](crate::GitRepository) and in
/// memory by [`MemoryRepository`](crate::MemoryRepository).
pub trait RepoAccess {
    /// Resolves a revision expression (full id, branch, tag, `HEAD~2`, ...)
    /// to a commit id.
    fn resolve(&self, rev: &str) -> Result<ObjectId, StatsError>;

    /// Returns `true` if `commit` names a commit in the repository.
    fn contains_commit(&self, commit: ObjectId) -> bool;

    /// Lists the regular files of a commit's tree, keeping at most `limit`.
    fn list_files(&self, commit: ObjectId, limit: usize) -> Result<TreeListing, StatsError>;

    /// Lists the regular-file differences from `from`'s tree to `to`'s tree.
    fn diff(&self, from: ObjectId, to: ObjectId) -> Result<Vec<FileChange>, StatsError>;

    /// Reads a blob's content.
    fn read_blob(&self, blob: ObjectId) -> Result<Vec<u8>, StatsError>;
}
