//! An in-memory [`RepoAccess`] used by the test suites.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};

use polyglot_common::ObjectId;

use crate::error::StatsError;
use crate::repo::{FileChange, FileEntry, RepoAccess, TreeListing};

/// A repository held entirely in memory.
///
/// Commits are flat path → content snapshots. Ids are assigned sequentially
/// and identical contents share one blob id, so unchanged files never show
/// up in a diff. Blob reads and tree listings are counted to let tests
/// assert how much work an incremental scan did.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    commits: HashMap<ObjectId, BTreeMap<String, ObjectId>>,
    blobs: HashMap<ObjectId, Vec<u8>>,
    blob_ids: HashMap<Vec<u8>, ObjectId>,
    refs: HashMap<String, ObjectId>,
    next_id: u64,
    blob_reads: Cell<usize>,
    tree_listings: Cell<usize>,
}

impl MemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a commit with the given files and points `name` at it.
    pub fn commit<P, C>(&mut self, name: &str, files: &[(P, C)]) -> ObjectId
    where
        P: AsRef<str>,
        C: AsRef<[u8]>,
    {
        let mut tree = BTreeMap::new();
        for (path, content) in files {
            let blob = self.intern_blob(content.as_ref());
            tree.insert(path.as_ref().to_string(), blob);
        }
        let id = self.allocate_id();
        self.commits.insert(id, tree);
        self.refs.insert(name.to_string(), id);
        id
    }

    /// Derives a commit from `parent`: applies `changes` (path, `Some(content)`
    /// to write or `None` to delete) and points `name` at the result.
    pub fn commit_on<P, C>(
        &mut self,
        parent: ObjectId,
        name: &str,
        changes: &[(P, Option<C>)],
    ) -> ObjectId
    where
        P: AsRef<str>,
        C: AsRef<[u8]>,
    {
        let mut tree = self.commits.get(&parent).cloned().unwrap_or_default();
        for (path, content) in changes {
            match content {
                Some(content) => {
                    let blob = self.intern_blob(content.as_ref());
                    tree.insert(path.as_ref().to_string(), blob);
                }
                None => {
                    tree.remove(path.as_ref());
                }
            }
        }
        let id = self.allocate_id();
        self.commits.insert(id, tree);
        self.refs.insert(name.to_string(), id);
        id
    }

    /// Number of blob reads since creation or the last [`reset_reads`](Self::reset_reads).
    pub fn blob_reads(&self) -> usize {
        self.blob_reads.get()
    }

    /// Number of [`list_files`](RepoAccess::list_files) calls since creation
    /// or the last [`reset_reads`](Self::reset_reads).
    pub fn tree_listings(&self) -> usize {
        self.tree_listings.get()
    }

    /// Resets the blob read and tree listing counters.
    pub fn reset_reads(&self) {
        self.blob_reads.set(0);
        self.tree_listings.set(0);
    }

    fn intern_blob(&mut self, content: &[u8]) -> ObjectId {
        if let Some(id) = self.blob_ids.get(content) {
            return *id;
        }
        let id = self.allocate_id();
        self.blobs.insert(id, content.to_vec());
        self.blob_ids.insert(content.to_vec(), id);
        id
    }

    fn allocate_id(&mut self) -> ObjectId {
        self.next_id += 1;
        let mut raw = [0u8; 20];
        raw[12..].copy_from_slice(&self.next_id.to_be_bytes());
        ObjectId::from_raw(raw)
    }

    fn tree(&self, commit: ObjectId) -> Result<&BTreeMap<String, ObjectId>, StatsError> {
        self.commits
            .get(&commit)
            .ok_or(StatsError::CommitNotFound(commit))
    }
}

impl RepoAccess for MemoryRepository {
    fn resolve(&self, rev: &str) -> Result<ObjectId, StatsError> {
        if let Some(id) = self.refs.get(rev) {
            return Ok(*id);
        }
        match ObjectId::from_hex(rev) {
            Ok(id) if self.commits.contains_key(&id) => Ok(id),
            _ => Err(StatsError::RevisionNotFound {
                rev: rev.to_string(),
            }),
        }
    }

    fn contains_commit(&self, commit: ObjectId) -> bool {
        self.commits.contains_key(&commit)
    }

    fn list_files(&self, commit: ObjectId, limit: usize) -> Result<TreeListing, StatsError> {
        self.tree_listings.set(self.tree_listings.get() + 1);
        let tree = self.tree(commit)?;
        Ok(TreeListing {
            files: tree
                .iter()
                .take(limit)
                .map(|(path, blob)| FileEntry {
                    path: path.clone(),
                    blob: *blob,
                })
                .collect(),
            truncated: tree.len() > limit,
        })
    }

    fn diff(&self, from: ObjectId, to: ObjectId) -> Result<Vec<FileChange>, StatsError> {
        let old = self.tree(from)?;
        let new = self.tree(to)?;
        let entry = |path: &String, blob: &ObjectId| FileEntry {
            path: path.clone(),
            blob: *blob,
        };

        let mut changes = Vec::new();
        for (path, old_blob) in old {
            match new.get(path) {
                Some(new_blob) if new_blob == old_blob => {}
                Some(new_blob) => changes.push(FileChange::Modified {
                    old: entry(path, old_blob),
                    new: entry(path, new_blob),
                }),
                None => changes.push(FileChange::Removed(entry(path, old_blob))),
            }
        }
        for (path, new_blob) in new {
            if !old.contains_key(path) {
                changes.push(FileChange::Added(entry(path, new_blob)));
            }
        }
        Ok(changes)
    }

    fn read_blob(&self, blob: ObjectId) -> Result<Vec<u8>, StatsError> {
        self.blob_reads.set(self.blob_reads.get() + 1);
        self.blobs
            .get(&blob)
            .cloned()
            .ok_or(StatsError::BlobNotFound(blob))
    }
}
