//! Binary encoding of cache records.
//!
//! Layout of a cache blob:
//!
//! ```text
//! [u32 LE header length][bincode BlobHeader][zlib(bincode CacheRecord)]
//! ```
//!
//! The header carries magic bytes, the framing format version, and an XXH3
//! checksum of the compressed payload. Checking the checksum before
//! decompressing turns any truncation or corruption into a [`DecodeError`];
//! zlib alone would happily return a partial stream.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use polyglot_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, DecodeError};
use crate::record::CacheRecord;

/// Magic bytes identifying a polyglot cache blob.
const BLOB_MAGIC: [u8; 4] = *b"PGLT";

/// Framing format version. Increment on breaking changes to the header or
/// compression. Record layout changes bump the schema tag instead.
const BLOB_FORMAT_VERSION: u32 = 1;

/// Upper bound on the decompressed record, and on any length bincode is
/// allowed to claim while decoding.
const MAX_RECORD_LEN: usize = 16 * 1024 * 1024;

/// Size of the header length prefix.
const LEN_PREFIX: usize = 4;

/// Header prepended to every cache blob for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BlobHeader {
    magic: [u8; 4],
    format_version: u32,
    checksum: ContentHash,
}

fn bincode_config() -> impl bincode::config::Config {
    bincode::config::standard().with_limit::<MAX_RECORD_LEN>()
}

/// Encodes a record into a framed, compressed blob.
pub fn encode(record: &CacheRecord) -> Result<Vec<u8>, CacheError> {
    let serialization = |reason: String| CacheError::Serialization { reason };

    let body = bincode::serde::encode_to_vec(record, bincode_config())
        .map_err(|e| serialization(e.to_string()))?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&body)
        .map_err(|e| serialization(e.to_string()))?;
    let payload = encoder.finish().map_err(|e| serialization(e.to_string()))?;

    let header = BlobHeader {
        magic: BLOB_MAGIC,
        format_version: BLOB_FORMAT_VERSION,
        checksum: ContentHash::from_bytes(&payload),
    };
    let header_bytes = bincode::serde::encode_to_vec(&header, bincode_config())
        .map_err(|e| serialization(e.to_string()))?;
    let header_len =
        u32::try_from(header_bytes.len()).map_err(|e| serialization(e.to_string()))?;

    let mut output = Vec::with_capacity(LEN_PREFIX + header_bytes.len() + payload.len());
    output.extend_from_slice(&header_len.to_le_bytes());
    output.extend_from_slice(&header_bytes);
    output.extend_from_slice(&payload);
    Ok(output)
}

/// Decodes a blob produced by [`encode`].
///
/// Never panics on malformed input. Does not check the record's version;
/// that is the controller's decision.
pub fn decode(bytes: &[u8]) -> Result<CacheRecord, DecodeError> {
    let (prefix, rest) = split(bytes, LEN_PREFIX)?;
    let mut len_bytes = [0u8; LEN_PREFIX];
    len_bytes.copy_from_slice(prefix);
    let header_len = u32::from_le_bytes(len_bytes) as usize;

    let (header_bytes, payload) = split(rest, header_len).map_err(|_| DecodeError::Truncated {
        needed: LEN_PREFIX.saturating_add(header_len),
        available: bytes.len(),
    })?;

    let (header, used): (BlobHeader, usize) =
        bincode::serde::decode_from_slice(header_bytes, bincode_config()).map_err(|e| {
            DecodeError::InvalidHeader {
                reason: e.to_string(),
            }
        })?;
    if used != header_bytes.len() {
        return Err(DecodeError::InvalidHeader {
            reason: format!("header length {header_len} but {used} bytes decoded"),
        });
    }
    if header.magic != BLOB_MAGIC {
        return Err(DecodeError::BadMagic {
            found: header.magic,
        });
    }
    if header.format_version != BLOB_FORMAT_VERSION {
        return Err(DecodeError::UnsupportedFormat {
            found: header.format_version,
            expected: BLOB_FORMAT_VERSION,
        });
    }
    if !header.checksum.verifies(payload) {
        return Err(DecodeError::ChecksumMismatch {
            expected: header.checksum.to_string(),
            actual: ContentHash::from_bytes(payload).to_string(),
        });
    }

    let mut body = Vec::new();
    ZlibDecoder::new(payload)
        .take(MAX_RECORD_LEN as u64 + 1)
        .read_to_end(&mut body)
        .map_err(DecodeError::Decompress)?;
    if body.len() > MAX_RECORD_LEN {
        return Err(DecodeError::TooLarge {
            limit: MAX_RECORD_LEN,
        });
    }

    let (record, used): (CacheRecord, usize) =
        bincode::serde::decode_from_slice(&body, bincode_config()).map_err(|e| {
            DecodeError::Malformed {
                reason: e.to_string(),
            }
        })?;
    if used != body.len() {
        return Err(DecodeError::TrailingBytes {
            extra: body.len() - used,
        });
    }
    Ok(record)
}

fn split(bytes: &[u8], at: usize) -> Result<(&[u8], &[u8]), DecodeError> {
    if bytes.len() < at {
        return Err(DecodeError::Truncated {
            needed: at,
            available: bytes.len(),
        });
    }
    Ok(bytes.split_at(at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyglot_common::{LanguageStats, ObjectId};
    use proptest::prelude::*;

    const V: &str = "polyglot-cache-v1+test";

    fn sample() -> CacheRecord {
        let stats: LanguageStats = [("Ruby", 1000u64), ("JavaScript", 200)].into_iter().collect();
        CacheRecord::new(V, ObjectId::from_raw([0x5a; 20]), stats)
    }

    /// Rebuilds a blob around `payload` with a valid header for it.
    fn frame(header: &BlobHeader, payload: &[u8]) -> Vec<u8> {
        let header_bytes = bincode::serde::encode_to_vec(header, bincode_config()).unwrap();
        let mut out = Vec::new();
        out.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(&header_bytes);
        out.extend_from_slice(payload);
        out
    }

    fn compress(body: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(body).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn roundtrip() {
        let record = sample();
        let blob = encode(&record).unwrap();
        assert_eq!(decode(&blob).unwrap(), record);
    }

    #[test]
    fn roundtrip_frozen() {
        let record = CacheRecord::frozen(V);
        assert_eq!(decode(&encode(&record).unwrap()).unwrap(), record);
    }

    #[test]
    fn starts_with_header_length() {
        let blob = encode(&sample()).unwrap();
        let header_len = u32::from_le_bytes(blob[..4].try_into().unwrap()) as usize;
        assert!(blob.len() > 4 + header_len);
    }

    #[test]
    fn every_truncation_fails() {
        let blob = encode(&sample()).unwrap();
        for cut in 0..blob.len() {
            assert!(
                decode(&blob[..cut]).is_err(),
                "prefix of {cut}/{} bytes decoded",
                blob.len()
            );
        }
    }

    #[test]
    fn flipped_payload_byte_fails_checksum() {
        let mut blob = encode(&sample()).unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0xff;
        assert!(matches!(
            decode(&blob),
            Err(DecodeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn appended_byte_fails_checksum() {
        let mut blob = encode(&sample()).unwrap();
        blob.push(0);
        assert!(decode(&blob).is_err());
    }

    #[test]
    fn garbage_fails() {
        assert!(decode(b"garbage data that is not a cache").is_err());
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn wrong_magic_fails() {
        let payload = compress(b"irrelevant");
        let header = BlobHeader {
            magic: *b"BAAD",
            format_version: BLOB_FORMAT_VERSION,
            checksum: ContentHash::from_bytes(&payload),
        };
        assert!(matches!(
            decode(&frame(&header, &payload)),
            Err(DecodeError::BadMagic { .. })
        ));
    }

    #[test]
    fn wrong_format_version_fails() {
        let payload = compress(b"irrelevant");
        let header = BlobHeader {
            magic: BLOB_MAGIC,
            format_version: 999,
            checksum: ContentHash::from_bytes(&payload),
        };
        assert!(matches!(
            decode(&frame(&header, &payload)),
            Err(DecodeError::UnsupportedFormat { found: 999, .. })
        ));
    }

    #[test]
    fn checksummed_non_zlib_payload_fails_to_decompress() {
        let payload = b"definitely not zlib".to_vec();
        let header = BlobHeader {
            magic: BLOB_MAGIC,
            format_version: BLOB_FORMAT_VERSION,
            checksum: ContentHash::from_bytes(&payload),
        };
        assert!(matches!(
            decode(&frame(&header, &payload)),
            Err(DecodeError::Decompress(_))
        ));
    }

    #[test]
    fn checksummed_non_record_payload_is_malformed() {
        let payload = compress(&[0xff; 3]);
        let header = BlobHeader {
            magic: BLOB_MAGIC,
            format_version: BLOB_FORMAT_VERSION,
            checksum: ContentHash::from_bytes(&payload),
        };
        assert!(matches!(
            decode(&frame(&header, &payload)),
            Err(DecodeError::Malformed { .. })
        ));
    }

    #[test]
    fn trailing_bytes_after_record_fail() {
        let mut body = bincode::serde::encode_to_vec(&sample(), bincode_config()).unwrap();
        body.push(0);
        let payload = compress(&body);
        let header = BlobHeader {
            magic: BLOB_MAGIC,
            format_version: BLOB_FORMAT_VERSION,
            checksum: ContentHash::from_bytes(&payload),
        };
        assert!(matches!(
            decode(&frame(&header, &payload)),
            Err(DecodeError::TrailingBytes { extra: 1 })
        ));
    }

    #[test]
    fn invalid_commit_hex_is_malformed() {
        #[derive(Serialize)]
        struct RawRecord<'a> {
            version: &'a str,
            commit: &'a str,
            stats: std::collections::BTreeMap<String, u64>,
        }
        let raw = RawRecord {
            version: V,
            commit: "not-a-commit",
            stats: Default::default(),
        };
        let payload = compress(&bincode::serde::encode_to_vec(&raw, bincode_config()).unwrap());
        let header = BlobHeader {
            magic: BLOB_MAGIC,
            format_version: BLOB_FORMAT_VERSION,
            checksum: ContentHash::from_bytes(&payload),
        };
        assert!(matches!(
            decode(&frame(&header, &payload)),
            Err(DecodeError::Malformed { .. })
        ));
    }

    fn record_strategy() -> impl Strategy<Value = CacheRecord> {
        (
            "[a-z0-9.+-]{0,24}",
            any::<[u8; 20]>(),
            prop::collection::btree_map("[A-Za-z+# ]{1,16}", 1u64..u64::MAX, 0..24),
        )
            .prop_map(|(version, commit, stats)| {
                CacheRecord::new(version, ObjectId::from_raw(commit), stats.into())
            })
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(record in record_strategy()) {
            let blob = encode(&record).unwrap();
            prop_assert_eq!(decode(&blob).unwrap(), record);
        }

        #[test]
        fn truncated_blobs_never_decode(record in record_strategy(), frac in 0.0f64..1.0) {
            let blob = encode(&record).unwrap();
            let cut = ((blob.len() as f64) * frac) as usize;
            prop_assert!(decode(&blob[..cut.min(blob.len() - 1)]).is_err());
        }
    }
}
