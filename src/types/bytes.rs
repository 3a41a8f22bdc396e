//! Variable-length byte strings carried as hex in JSON.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::ops::Deref;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{ScaleReader, extract};
use crate::error::Result;

// ============================================================================
// ByteData
// ============================================================================

/// Opaque bytes, e.g. an encoded extrinsic, storage value or metadata blob.
///
/// JSON form is a `0x`-prefixed hex string. Use [`ByteData::decode`] to
/// interpret the content with a codec reader.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteData(Vec<u8>);

impl ByteData {
    /// Wraps raw bytes.
    #[inline]
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Parses hex, with or without `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self> {
        extract::decode_hex(input).map(Self)
    }

    /// Returns the content as `0x`-prefixed lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }

    /// Decodes the content with `reader`.
    pub fn decode<T, R: ScaleReader<T> + ?Sized>(&self, reader: &R) -> Result<T> {
        extract::from_bytes(reader, &self.0)
    }

    /// Returns the raw bytes.
    #[inline]
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for ByteData {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for ByteData {
    #[inline]
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for ByteData {
    #[inline]
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for ByteData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ByteData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteData({})", self.to_hex())
    }
}

impl Serialize for ByteData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ByteData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct HexVisitor;

        impl Visitor<'_> for HexVisitor {
            type Value = ByteData;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a 0x-prefixed hex string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ByteData, E> {
                ByteData::from_hex(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(HexVisitor)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::codec::StringReader;

    #[test]
    fn test_hex_round_trip() {
        let data = ByteData::from_hex("0x0102ff").expect("parse");
        assert_eq!(&*data, &[0x01, 0x02, 0xff]);
        assert_eq!(data.to_string(), "0x0102ff");
    }

    #[test]
    fn test_empty() {
        let data = ByteData::from_hex("0x").expect("parse");
        assert!(data.is_empty());
        assert_eq!(serde_json::to_string(&data).expect("json"), "\"0x\"");
    }

    #[test]
    fn test_json_and_decode() {
        let data: ByteData = serde_json::from_str("\"0x0c616263\"").expect("json");
        assert_eq!(data.decode(&StringReader).expect("decode"), "abc");
    }

    #[test]
    fn test_invalid_hex() {
        assert!(serde_json::from_str::<ByteData>("\"0xabc\"").is_err());
    }
}
