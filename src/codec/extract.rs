//! One-shot encode/decode helpers.
//!
//! RPC results that carry SCALE data arrive as `0x`-prefixed hex strings;
//! these helpers bridge between those strings and the reader/writer
//! strategies.

// ============================================================================
// Imports
// ============================================================================

use crate::error::Result;

use super::{ScaleCodecReader, ScaleCodecWriter, ScaleReader, ScaleWriter};

// ============================================================================
// Decoding
// ============================================================================

/// Decodes one value from the start of `bytes`.
///
/// Bytes left over after the value are ignored.
pub fn from_bytes<T, R: ScaleReader<T> + ?Sized>(reader: &R, bytes: &[u8]) -> Result<T> {
    ScaleCodecReader::new(bytes).read(reader)
}

/// Decodes one value from a hex string, with or without `0x` prefix.
pub fn from_hex<T, R: ScaleReader<T> + ?Sized>(reader: &R, hex_str: &str) -> Result<T> {
    let bytes = decode_hex(hex_str)?;
    from_bytes(reader, &bytes)
}

/// Parses a hex string, with or without `0x` prefix.
pub fn decode_hex(hex_str: &str) -> Result<Vec<u8>> {
    let digits = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    Ok(hex::decode(digits)?)
}

// ============================================================================
// Encoding
// ============================================================================

/// Encodes one value into a fresh byte vector.
pub fn to_bytes<T: ?Sized, W: ScaleWriter<T> + ?Sized>(writer: &W, value: &T) -> Result<Vec<u8>> {
    let mut wrt = ScaleCodecWriter::new();
    wrt.write(writer, value)?;
    Ok(wrt.into_bytes())
}

/// Encodes one value as a `0x`-prefixed lowercase hex string.
pub fn to_hex<T: ?Sized, W: ScaleWriter<T> + ?Sized>(writer: &W, value: &T) -> Result<String> {
    Ok(format!("0x{}", hex::encode(to_bytes(writer, value)?)))
}

// ============================================================================
// Tests
// ============================================================================
