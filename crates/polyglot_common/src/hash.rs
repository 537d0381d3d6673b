//! Content checksums for cache framing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit XXH3 checksum over a byte payload.
///
/// The cache codec stores one of these next to the compressed record so that
/// a truncated or bit-flipped file is detected before decompression.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes the checksum of a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Returns `true` if `data` hashes to this checksum.
    pub fn verifies(&self, data: &[u8]) -> bool {
        Self::from_bytes(data) == *self
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = ContentHash::from_bytes(b"ruby 1000");
        let b = ContentHash::from_bytes(b"ruby 1000");
        assert_eq!(a, b);
    }

    #[test]
    fn verifies_only_matching_payload() {
        let h = ContentHash::from_bytes(b"payload");
        assert!(h.verifies(b"payload"));
        assert!(!h.verifies(b"payloa"));
        assert!(!h.verifies(b""));
    }

    #[test]
    fn display_is_32_hex_chars() {
        let s = ContentHash::from_bytes(b"test").to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn debug_abbreviated() {
        let s = format!("{:?}", ContentHash::from_bytes(b"test"));
        assert!(s.starts_with("ContentHash("));
        assert!(s.ends_with(')'));
    }
}
