//! The repository an invocation operates on, with its settings.

use polyglot_cache::{CacheStore, StatsCache};
use polyglot_config::{load_config, resolve_settings, Overrides, PolyglotConfig, ResolvedSettings};
use polyglot_stats::{Classifier, GitRepository};
use tracing::debug;

use crate::error::CliError;
use crate::GlobalArgs;

/// An opened repository and the settings resolved for it.
pub struct Workspace {
    /// The repository found from `--repo`.
    pub repo: GitRepository,
    /// `polyglot.toml` merged with command-line flags.
    pub settings: ResolvedSettings,
}

impl Workspace {
    /// Discovers the repository and loads `polyglot.toml` from its work tree.
    ///
    /// Bare repositories have no work tree and use the defaults.
    pub fn open(global: &GlobalArgs, overrides: &Overrides) -> Result<Self, CliError> {
        let repo = GitRepository::discover(&global.repo)?;
        let config = match repo.workdir() {
            Some(root) => load_config(root)?,
            None => PolyglotConfig::default(),
        };
        let settings = resolve_settings(&config, overrides)?;
        debug!(?settings, "resolved settings");
        Ok(Self { repo, settings })
    }

    /// The cache file store inside the git directory.
    pub fn store(&self) -> CacheStore {
        CacheStore::in_dir(self.repo.git_dir(), &self.settings.cache_file)
    }

    /// The statistics cache for records produced by `classifier`.
    pub fn cache<C: Classifier + ?Sized>(&self, classifier: &C) -> StatsCache {
        StatsCache::for_classifier(self.store(), classifier)
    }
}
