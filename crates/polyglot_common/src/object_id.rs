//! Git object identifiers and the reserved null commit.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of a SHA-1 object id in raw bytes.
pub const OBJECT_ID_LEN: usize = 20;

/// A 20-byte git object identifier, written as 40 lowercase hex characters.
///
/// The all-zero id is reserved as [`ObjectId::NULL`]. A cache record whose
/// commit is `NULL` is frozen: it must never be treated as a real ancestor.
///
/// Serializes as its hex string in every format, so the on-disk cache and the
/// `dump-cache` JSON agree on representation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

/// Error returned when a string is not a 40-character hex object id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid object id '{input}': expected 40 hex characters")]
pub struct ParseObjectIdError {
    /// The rejected input.
    pub input: String,
}

impl ObjectId {
    /// The null commit: marks a frozen cache.
    pub const NULL: ObjectId = ObjectId([0; OBJECT_ID_LEN]);

    /// Wraps raw id bytes.
    pub const fn from_raw(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Builds an id from a byte slice, returning `None` unless it is exactly
    /// 20 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; OBJECT_ID_LEN] = bytes.try_into().ok()?;
        Some(Self(raw))
    }

    /// Parses a 40-character hex string (either case).
    pub fn from_hex(s: &str) -> Result<Self, ParseObjectIdError> {
        let err = || ParseObjectIdError {
            input: s.to_string(),
        };
        let bytes = s.as_bytes();
        if bytes.len() != OBJECT_ID_LEN * 2 {
            return Err(err());
        }
        let mut raw = [0u8; OBJECT_ID_LEN];
        for (i, pair) in bytes.chunks_exact(2).enumerate() {
            let hi = hex_value(pair[0]).ok_or_else(err)?;
            let lo = hex_value(pair[1]).ok_or_else(err)?;
            raw[i] = (hi << 4) | lo;
        }
        Ok(Self(raw))
    }

    /// Returns the raw id bytes.
    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LEN] {
        &self.0
    }

    /// Returns `true` for the reserved null commit.
    pub fn is_null(&self) -> bool {
        self.0 == [0; OBJECT_ID_LEN]
    }

    /// Returns the first seven hex characters, for log messages.
    pub fn short(&self) -> String {
        let mut s = self.to_string();
        s.truncate(7);
        s
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl FromStr for ObjectId {
    type Err = ParseObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexVisitor;

        impl Visitor<'_> for HexVisitor {
            type Value = ObjectId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a 40-character hex object id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ObjectId, E> {
                ObjectId::from_hex(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(HexVisitor)
    }
}
