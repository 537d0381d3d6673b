//! Error types for cache operations.

use std::path::PathBuf;

/// Errors raised while writing or removing the cache file.
///
/// Reads never produce a `CacheError`: an unreadable file is treated as an
/// absent one. The controller logs write failures and carries on, since the
/// statistics it computed are correct whether or not they were saved.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while writing or removing the cache file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The directory meant to hold the cache file does not exist.
    #[error("cache directory {path} does not exist")]
    MissingDirectory {
        /// The missing directory.
        path: PathBuf,
    },

    /// The record could not be serialized or compressed.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

/// Reasons a cache blob could not be turned back into a record.
///
/// Every variant means the same thing to the controller: there is no usable
/// cache. The distinctions exist for `dump-cache` and debug logs.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The blob ends before a complete header or payload.
    #[error("cache blob truncated: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required to continue.
        needed: usize,
        /// Bytes actually present.
        available: usize,
    },

    /// The header could not be decoded.
    #[error("invalid cache header: {reason}")]
    InvalidHeader {
        /// Description of the header problem.
        reason: String,
    },

    /// The magic bytes do not identify a polyglot cache.
    #[error("not a polyglot cache (magic {found:?})")]
    BadMagic {
        /// The magic bytes found.
        found: [u8; 4],
    },

    /// The framing format version is not understood.
    #[error("unsupported cache format {found} (expected {expected})")]
    UnsupportedFormat {
        /// The format version found in the header.
        found: u32,
        /// The format version this build writes.
        expected: u32,
    },

    /// The payload does not match the checksum in the header.
    #[error("cache checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The checksum stored in the header.
        expected: String,
        /// The checksum of the payload present.
        actual: String,
    },

    /// The payload is not a valid zlib stream.
    #[error("cache payload failed to decompress: {0}")]
    Decompress(#[source] std::io::Error),

    /// The payload decompresses to more than the allowed record size.
    #[error("cache payload exceeds {limit} bytes")]
    TooLarge {
        /// The maximum decompressed size.
        limit: usize,
    },

    /// The decompressed payload is not a valid record.
    #[error("malformed cache record: {reason}")]
    Malformed {
        /// Description of the decoding failure.
        reason: String,
    },

    /// The record is followed by unexpected bytes.
    #[error("cache record followed by {extra} trailing bytes")]
    TrailingBytes {
        /// Number of unexpected bytes.
        extra: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("/repo/.git/polyglot-cache"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("polyglot-cache"));
    }

    #[test]
    fn missing_directory_display() {
        let err = CacheError::MissingDirectory {
            path: PathBuf::from("/nowhere/.git"),
        };
        assert_eq!(err.to_string(), "cache directory /nowhere/.git does not exist");
    }

    #[test]
    fn truncated_display() {
        let err = DecodeError::Truncated {
            needed: 40,
            available: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("need 40"));
        assert!(msg.contains("have 12"));
    }

    #[test]
    fn unsupported_format_display() {
        let err = DecodeError::UnsupportedFormat {
            found: 9,
            expected: 1,
        };
        assert_eq!(err.to_string(), "unsupported cache format 9 (expected 1)");
    }

    #[test]
    fn checksum_mismatch_display() {
        let err = DecodeError::ChecksumMismatch {
            expected: "aabb".to_string(),
            actual: "ccdd".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("aabb"));
        assert!(msg.contains("ccdd"));
    }
}
