//! The on-disk cache file.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CacheError;

/// Location of a repository's cache file.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a reader sees either the old blob or the new one and
/// never a partial write. The file is left with mode `0644`.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    /// Creates a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store for `file_name` inside `dir`.
    pub fn in_dir(dir: &Path, file_name: &str) -> Self {
        Self::new(dir.join(file_name))
    }

    /// The cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole cache file.
    ///
    /// Returns `None` when the file is missing or cannot be read.
    pub fn read(&self) -> Option<Vec<u8>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "cache file not readable");
                None
            }
        }
    }

    /// Atomically replaces the cache file with `bytes`.
    pub fn write(&self, bytes: &[u8]) -> Result<(), CacheError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if !dir.is_dir() {
            return Err(CacheError::MissingDirectory {
                path: dir.to_path_buf(),
            });
        }

        let io_err = |source: std::io::Error| CacheError::Io {
            path: self.path.clone(),
            source,
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".polyglot-cache")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(io_err)?;
        tmp.write_all(bytes).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o644))
                .map_err(io_err)?;
        }

        debug!(path = %self.path.display(), bytes = bytes.len(), "cache file written");
        Ok(())
    }

    /// Deletes the cache file. Returns `false` if there was none.
    pub fn remove(&self) -> Result<bool, CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CacheError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
