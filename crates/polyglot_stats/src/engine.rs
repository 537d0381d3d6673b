//! Full and incremental statistics computation.

use std::collections::BTreeMap;

use polyglot_common::{LanguageStats, ObjectId};
use tracing::debug;

use crate::classify::{Classification, Classifier};
use crate::error::StatsError;
use crate::repo::{FileEntry, RepoAccess};

/// Files per language for one commit: language → sorted paths.
pub type FileBreakdown = BTreeMap<String, Vec<String>>;

/// Language statistics of one commit and the size of the tree they cover.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitStats {
    /// Language weights.
    pub stats: LanguageStats,
    /// Regular files in the tree, or `None` if the tree exceeds the file cap.
    pub file_count: Option<u64>,
}

/// The two computations a statistics cache needs from its backend.
///
/// Neither method touches any cache; the caller decides what to persist.
pub trait StatsProvider {
    /// Classifies every file of `commit` (up to the tree-size cap).
    fn compute_full(&self, commit: ObjectId) -> Result<CommitStats, StatsError>;

    /// Derives the statistics of `commit` from those of `baseline`.
    ///
    /// Must return the same value as `compute_full(commit)` whenever
    /// `base == compute_full(baseline)`.
    fn compute_incremental(
        &self,
        commit: ObjectId,
        baseline: ObjectId,
        base: CommitStats,
    ) -> Result<CommitStats, StatsError>;
}

/// Computes language statistics for commits of one repository.
pub struct StatsEngine<R, C> {
    repo: R,
    classifier: C,
    max_tree_size: usize,
}

impl<R: RepoAccess, C: Classifier> StatsEngine<R, C> {
    /// Creates an engine that considers at most `max_tree_size` files per
    /// tree.
    pub fn new(repo: R, classifier: C, max_tree_size: usize) -> Self {
        Self {
            repo,
            classifier,
            max_tree_size,
        }
    }

    /// The repository being scanned.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// The classifier in use.
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Classifies the first `max_tree_size` files of `commit`'s tree.
    pub fn compute_full(&self, commit: ObjectId) -> Result<CommitStats, StatsError> {
        let listing = self.repo.list_files(commit, self.max_tree_size)?;
        if listing.truncated {
            debug!(
                commit = %commit.short(),
                cap = self.max_tree_size,
                "tree exceeds the file cap; remaining files ignored"
            );
        }

        let mut stats = LanguageStats::new();
        for entry in &listing.files {
            if let Some(c) = self.classify_entry(entry)? {
                stats.add(&c.language, c.weight);
            }
        }
        debug!(commit = %commit.short(), files = listing.files.len(), "full scan complete");
        Ok(CommitStats {
            stats,
            file_count: (!listing.truncated).then_some(listing.files.len() as u64),
        })
    }

    /// Updates `base` (the statistics of `baseline`) to describe `commit`,
    /// reclassifying only files that differ between the two trees.
    ///
    /// Neither tree is listed. The size of `commit`'s tree follows from
    /// `base.file_count` and the diff. When either tree exceeds the file cap
    /// this falls back to a full scan, because the capped file sets of the
    /// two trees are not related by the diff.
    pub fn compute_incremental(
        &self,
        commit: ObjectId,
        baseline: ObjectId,
        base: CommitStats,
    ) -> Result<CommitStats, StatsError> {
        if baseline.is_null() || !self.repo.contains_commit(baseline) {
            return Err(StatsError::BaselineUnavailable(baseline));
        }
        if baseline == commit {
            return Ok(base);
        }
        let cap = self.max_tree_size as u64;
        let Some(base_files) = base.file_count.filter(|&n| n <= cap) else {
            debug!(baseline = %baseline.short(), "baseline tree exceeds the file cap; full scan");
            return self.compute_full(commit);
        };

        let changes = self.repo.diff(baseline, commit)?;
        let removed_files = changes.iter().filter(|c| c.before().is_some()).count() as u64;
        let added_files = changes.iter().filter(|c| c.after().is_some()).count() as u64;
        let file_count = base_files
            .checked_sub(removed_files)
            .ok_or(StatsError::InconsistentFileCount {
                recorded: base_files,
                removed: removed_files,
            })?
            + added_files;
        if file_count > cap {
            debug!(commit = %commit.short(), "tree exceeds the file cap; full scan");
            return self.compute_full(commit);
        }

        let mut removed = LanguageStats::new();
        let mut added = LanguageStats::new();
        for change in &changes {
            if let Some(old) = change.before() {
                if let Some(c) = self.classify_entry(old)? {
                    removed.add(&c.language, c.weight);
                }
            }
            if let Some(new) = change.after() {
                if let Some(c) = self.classify_entry(new)? {
                    added.add(&c.language, c.weight);
                }
            }
        }

        let mut stats = base.stats;
        for (language, weight) in &removed {
            stats.subtract(language, *weight)?;
        }
        for (language, weight) in &added {
            stats.add(language, *weight);
        }
        debug!(
            commit = %commit.short(),
            baseline = %baseline.short(),
            changed = changes.len(),
            "incremental scan complete"
        );
        Ok(CommitStats {
            stats,
            file_count: Some(file_count),
        })
    }

    /// Lists which files of `commit` were assigned to which language.
    pub fn breakdown(&self, commit: ObjectId) -> Result<FileBreakdown, StatsError> {
        let listing = self.repo.list_files(commit, self.max_tree_size)?;
        let mut breakdown = FileBreakdown::new();
        for entry in &listing.files {
            if let Some(c) = self.classify_entry(entry)? {
                breakdown.entry(c.language).or_default().push(entry.path.clone());
            }
        }
        for paths in breakdown.values_mut() {
            paths.sort();
        }
        Ok(breakdown)
    }

    fn classify_entry(&self, entry: &FileEntry) -> Result<Option<Classification>, StatsError> {
        let content = self.repo.read_blob(entry.blob)?;
        Ok(self.classifier.classify(&entry.path, &content))
    }
}

impl<R: RepoAccess, C: Classifier> StatsProvider for StatsEngine<R, C> {
    fn compute_full(&self, commit: ObjectId) -> Result<CommitStats, StatsError> {
        StatsEngine::compute_full(self, commit)
    }

    fn compute_incremental(
        &self,
        commit: ObjectId,
        baseline: ObjectId,
        base: CommitStats,
    ) -> Result<CommitStats, StatsError> {
        StatsEngine::compute_incremental(self, commit, baseline, base)
    }
}
