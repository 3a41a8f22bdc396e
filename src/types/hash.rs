//! Fixed-size byte values: 256-bit and 512-bit hashes.
//!
//! On the SCALE wire they are raw 32/64 bytes with no prefix. In JSON they
//! are `0x`-prefixed hex strings.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{ScaleCodecReader, ScaleCodecWriter, ScaleReader, ScaleWriter};
use crate::error::{Error, Result};

// ============================================================================
// Parsing
// ============================================================================

/// Parses exactly `N` bytes of hex, with or without `0x` prefix.
fn parse_fixed<const N: usize>(input: &str) -> Result<[u8; N]> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    if digits.len() != N * 2 {
        return Err(Error::malformed(format!(
            "expected {} hex digits, got {}",
            N * 2,
            digits.len()
        )));
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out)?;
    Ok(out)
}

// ============================================================================
// Fixed Hash Types
// ============================================================================

macro_rules! fixed_hash {
    ($(#[$doc:meta])* $name:ident, $reader:ident, $writer:ident, $len:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $len]);

        impl $name {
            /// Size in bytes.
            pub const LEN: usize = $len;

            /// Creates a value from raw bytes.
            #[inline]
            #[must_use]
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Creates a value from a slice of exactly the right length.
            ///
            /// # Errors
            ///
            /// Returns [`Error::Encoding`] on a length mismatch.
            pub fn from_slice(bytes: &[u8]) -> Result<Self> {
                let array = <[u8; $len]>::try_from(bytes).map_err(|_| {
                    Error::encoding(format!(
                        "{} needs {} bytes, got {}",
                        stringify!($name),
                        $len,
                        bytes.len()
                    ))
                })?;
                Ok(Self(array))
            }

            /// Parses from hex, with or without `0x` prefix.
            pub fn from_hex(input: &str) -> Result<Self> {
                parse_fixed::<$len>(input).map(Self)
            }

            /// Returns the raw bytes.
            #[inline]
            #[must_use]
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Returns the value as `0x`-prefixed lowercase hex.
            #[must_use]
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self([0u8; $len])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::from_hex(s)
            }
        }

        impl From<[u8; $len]> for $name {
            #[inline]
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            #[inline]
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                struct HexVisitor;

                impl Visitor<'_> for HexVisitor {
                    type Value = $name;

                    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        write!(f, "a hex string of {} bytes", $len)
                    }

                    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<$name, E> {
                        $name::from_hex(v).map_err(E::custom)
                    }
                }

                deserializer.deserialize_str(HexVisitor)
            }
        }

        #[doc = concat!("Reads a [`", stringify!($name), "`] as raw bytes.")]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $reader;

        impl ScaleReader<$name> for $reader {
            #[inline]
            fn read(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<$name> {
                rdr.read_array().map($name)
            }
        }

        #[doc = concat!("Writes a [`", stringify!($name), "`] as raw bytes.")]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $writer;

        impl ScaleWriter<$name> for $writer {
            #[inline]
            fn write(&self, wrt: &mut ScaleCodecWriter, value: &$name) -> Result<()> {
                wrt.write_raw(&value.0);
                Ok(())
            }
        }
    };
}

fixed_hash!(
    /// A 256-bit value, typically a block or storage hash.
    Hash256,
    Hash256Reader,
    Hash256Writer,
    32
);

fixed_hash!(
    /// A 512-bit value, typically a signature.
    Hash512,
    Hash512Reader,
    Hash512Writer,
    64
);

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::codec::extract;

    const HASH: &str = "0x3d3d8a1a5e1fbb2b6ae2bde6a7b55c4c5e2cc35e8d9d0ccbf7c1e3b0a1b2c3d4";

    #[test]
    fn test_parse_with_and_without_prefix() {
        let a = Hash256::from_hex(HASH).expect("prefixed");
        let b: Hash256 = HASH[2..].parse().expect("bare");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), HASH);
    }

    #[test]
    fn test_parse_wrong_length() {
        assert!(Hash256::from_hex("0x1234").is_err());
        assert!(Hash512::from_hex(HASH).is_err());
    }

    #[test]
    fn test_from_slice() {
        assert!(Hash256::from_slice(&[0u8; 31]).is_err());
        let hash = Hash256::from_slice(&[1u8; 32]).expect("32 bytes");
        assert_eq!(hash.as_bytes(), &[1u8; 32]);
    }

    #[test]
    fn test_json_form() {
        let hash = Hash256::from_hex(HASH).expect("parse");
        let json = serde_json::to_string(&hash).expect("serialize");
        assert_eq!(json, format!("\"{HASH}\""));
        let back: Hash256 = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, hash);
        assert!(serde_json::from_str::<Hash256>("\"0x12\"").is_err());
    }

    #[test]
    fn test_scale_form() {
        let hash = Hash512::new([0xAB; 64]);
        let bytes = extract::to_bytes(&Hash512Writer, &hash).expect("encode");
        assert_eq!(bytes.len(), Hash512::LEN);
        assert_eq!(extract::from_bytes(&Hash512Reader, &bytes).expect("decode"), hash);
        assert!(extract::from_bytes(&Hash512Reader, &bytes[..63]).is_err());
    }
}
