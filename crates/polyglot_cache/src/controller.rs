//! The cache controller: decides how to compute a commit's statistics and
//! keeps the cache file current.

use polyglot_common::{LanguageStats, ObjectId};
use polyglot_stats::{Classifier, CommitStats, StatsError, StatsProvider};
use tracing::{debug, info, warn};

use crate::codec;
use crate::error::{CacheError, DecodeError};
use crate::record::{cache_version, CacheRecord, CacheState};
use crate::store::CacheStore;

/// How a computation may use the cached baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Extend the cached baseline when one is usable.
    Incremental,
    /// Ignore the cached baseline and classify the whole tree.
    Full,
}

impl ScanMode {
    /// `Incremental` if `incremental` is set, `Full` otherwise.
    pub fn from_incremental(incremental: bool) -> Self {
        if incremental {
            ScanMode::Incremental
        } else {
            ScanMode::Full
        }
    }
}

/// Per-repository statistics cache.
///
/// Holds no decoded state between calls: every operation reads the file
/// afresh, so concurrent writers are tolerated (last writer wins).
#[derive(Debug, Clone)]
pub struct StatsCache {
    store: CacheStore,
    version: String,
}

impl StatsCache {
    /// Creates a cache whose records are tagged with `version`.
    pub fn new(store: CacheStore, version: impl Into<String>) -> Self {
        Self {
            store,
            version: version.into(),
        }
    }

    /// Creates a cache tagged with the schema and `classifier`'s version.
    pub fn for_classifier<C: Classifier + ?Sized>(store: CacheStore, classifier: &C) -> Self {
        Self::new(store, cache_version(classifier.version()))
    }

    /// The version written into new records.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The backing store.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Loads and classifies the cache file.
    pub fn state(&self) -> CacheState {
        CacheState::classify(self.load(), &self.version)
    }

    fn load(&self) -> Option<CacheRecord> {
        let bytes = self.store.read()?;
        match codec::decode(&bytes) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(path = %self.store.path().display(), error = %e, "ignoring undecodable cache");
                None
            }
        }
    }

    /// Returns the language statistics of `commit`, reusing the cache where
    /// possible and saving the result.
    ///
    /// A frozen cache short-circuits everything. Otherwise the cached
    /// baseline is extended in [`ScanMode::Incremental`]; a baseline the
    /// provider rejects causes a full scan. Failing to save the result is
    /// logged and does not fail the call.
    pub fn compute<P: StatsProvider + ?Sized>(
        &self,
        provider: &P,
        commit: ObjectId,
        mode: ScanMode,
    ) -> Result<LanguageStats, StatsError> {
        let state = self.state();
        if let CacheState::Frozen { stats } = state {
            debug!("cache is frozen; skipping computation");
            return Ok(stats);
        }
        if commit.is_null() {
            return Err(StatsError::CommitNotFound(commit));
        }

        let computed = match (mode, state) {
            (ScanMode::Incremental, CacheState::Baseline { commit: baseline, base }) => {
                debug!(commit = %commit.short(), baseline = %baseline.short(), "incremental scan");
                match provider.compute_incremental(commit, baseline, base) {
                    Ok(computed) => computed,
                    Err(e) if e.is_baseline_error() => {
                        warn!(error = %e, "cached baseline unusable; recomputing from scratch");
                        provider.compute_full(commit)?
                    }
                    Err(e) => return Err(e),
                }
            }
            (mode, state) => {
                if let CacheState::Stale { version } = &state {
                    info!(found = %version, expected = %self.version, "discarding stale cache");
                }
                debug!(commit = %commit.short(), ?mode, "full scan");
                provider.compute_full(commit)?
            }
        };

        let record = CacheRecord::computed(self.version.clone(), commit, computed);
        if let Err(e) = self.persist(&record) {
            warn!(error = %e, "failed to save statistics cache");
        }
        Ok(record.stats)
    }

    /// Freezes the cache: later [`compute`](Self::compute) calls return empty
    /// statistics without scanning.
    pub fn disable(&self) -> Result<(), CacheError> {
        self.persist(&CacheRecord::frozen(self.version.clone()))?;
        info!(path = %self.store.path().display(), "statistics cache frozen");
        Ok(())
    }

    /// Deletes the cache file. Returns `false` if there was none.
    pub fn clear(&self) -> Result<bool, CacheError> {
        let removed = self.store.remove()?;
        if removed {
            info!(path = %self.store.path().display(), "statistics cache cleared");
        }
        Ok(removed)
    }

    /// Decodes the cache file without checking its version. `None` if the
    /// file does not exist.
    pub fn dump(&self) -> Result<Option<CacheRecord>, DecodeError> {
        self.store.read().map(|bytes| codec::decode(&bytes)).transpose()
    }

    fn persist(&self, record: &CacheRecord) -> Result<(), CacheError> {
        let bytes = codec::encode(record)?;
        self.store.write(&bytes)
    }
}
