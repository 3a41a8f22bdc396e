//! Read cursor and primitive readers.
//!
//! [`ScaleCodecReader`] is a forward-only cursor over a borrowed byte slice.
//! Every primitive read checks the remaining length first and fails with
//! [`Error::MalformedInput`] instead of panicking on short input.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};

use super::ScaleReader;
use super::compact;

// ============================================================================
// ScaleCodecReader
// ============================================================================

/// Forward-only cursor over SCALE-encoded bytes.
#[derive(Debug, Clone)]
pub struct ScaleCodecReader<'a> {
    /// Encoded input.
    source: &'a [u8],
    /// Offset of the next unread byte.
    pos: usize,
}

impl<'a> ScaleCodecReader<'a> {
    /// Creates a cursor at the start of `source`.
    #[inline]
    #[must_use]
    pub const fn new(source: &'a [u8]) -> Self {
        Self { source, pos: 0 }
    }

    /// Returns `true` if unread bytes remain.
    #[inline]
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.pos < self.source.len()
    }

    /// Returns the number of unread bytes.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.source.len() - self.pos
    }

    /// Returns the offset of the next unread byte.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Skips `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if fewer than `len` bytes remain.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Reads one value using `reader`.
    #[inline]
    pub fn read<T, R: ScaleReader<T> + ?Sized>(&mut self, reader: &R) -> Result<T> {
        reader.read(self)
    }

    /// Reads an optional value using `reader`'s optional form.
    #[inline]
    pub fn read_optional<T, R: ScaleReader<T> + ?Sized>(
        &mut self,
        reader: &R,
    ) -> Result<Option<T>> {
        reader.read_optional(self)
    }

    /// Reads a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        let byte = *self
            .source
            .get(self.pos)
            .ok_or_else(|| self.short_read(1))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(self.short_read(len));
        }
        let bytes = &self.source[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Reads exactly `N` raw bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Reads a compact integer as `u128`.
    #[inline]
    pub fn read_compact(&mut self) -> Result<u128> {
        compact::decode(self)
    }

    /// Reads a compact length prefix.
    pub fn read_compact_len(&mut self) -> Result<usize> {
        let len = self.read_compact()?;
        usize::try_from(len).map_err(|_| Error::malformed(format!("length {len} too large")))
    }

    /// Reads a length-prefixed byte array.
    pub fn read_byte_array(&mut self) -> Result<Vec<u8>> {
        self.read(&ByteArrayReader)
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        self.read(&StringReader)
    }

    /// Builds the error for a read of `wanted` bytes past the end.
    fn short_read(&self, wanted: usize) -> Error {
        Error::malformed(format!(
            "need {wanted} bytes at offset {}, only {} remain",
            self.pos,
            self.remaining()
        ))
    }
}

// ============================================================================
// Fixed-Width Integers
// ============================================================================

/// Reads an unsigned byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct UByteReader;

impl ScaleReader<u8> for UByteReader {
    #[inline]
    fn read(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<u8> {
        rdr.read_byte()
    }
}

macro_rules! le_reader {
    ($(#[$doc:meta])* $name:ident, $ty:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl ScaleReader<$ty> for $name {
            #[inline]
            fn read(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<$ty> {
                Ok(<$ty>::from_le_bytes(rdr.read_array()?))
            }
        }
    };
}

le_reader!(
    /// Reads a little-endian `u16`.
    UInt16Reader,
    u16
);
le_reader!(
    /// Reads a little-endian `u32`.
    UInt32Reader,
    u32
);
le_reader!(
    /// Reads a little-endian `u64`.
    UInt64Reader,
    u64
);
le_reader!(
    /// Reads a little-endian `u128`.
    UInt128Reader,
    u128
);

// ============================================================================
// Booleans
// ============================================================================

/// Reads a boolean: `0x00` false, `0x01` true.
///
/// Its optional form is the single tri-state byte of [`BoolOptionalReader`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolReader;

impl ScaleReader<bool> for BoolReader {
    fn read(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<bool> {
        match rdr.read_byte()? {
            0x00 => Ok(false),
            0x01 => Ok(true),
            other => Err(Error::malformed(format!(
                "invalid boolean byte 0x{other:02x}"
            ))),
        }
    }

    #[inline]
    fn read_optional(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<Option<bool>> {
        BoolOptionalReader.read(rdr)
    }
}

/// Reads an optional boolean from one byte.
///
/// `0x00` absent, `0x01` `Some(false)`, `0x02` `Some(true)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolOptionalReader;

impl ScaleReader<Option<bool>> for BoolOptionalReader {
    fn read(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<Option<bool>> {
        match rdr.read_byte()? {
            0x00 => Ok(None),
            0x01 => Ok(Some(false)),
            0x02 => Ok(Some(true)),
            other => Err(Error::malformed(format!(
                "invalid optional boolean byte 0x{other:02x}"
            ))),
        }
    }
}

// ============================================================================
// Byte Strings
// ============================================================================

/// Reads a compact-length-prefixed byte array.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteArrayReader;

impl ScaleReader<Vec<u8>> for ByteArrayReader {
    fn read(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<Vec<u8>> {
        let len = rdr.read_compact_len()?;
        Ok(rdr.read_bytes(len)?.to_vec())
    }
}

/// Reads a compact-length-prefixed UTF-8 string.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringReader;

impl ScaleReader<String> for StringReader {
    fn read(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<String> {
        let bytes = ByteArrayReader.read(rdr)?;
        String::from_utf8(bytes).map_err(|e| Error::malformed(format!("invalid UTF-8: {e}")))
    }
}

/// Reads exactly `N` raw bytes with no length prefix.
///
/// Used for 256-bit and 512-bit values.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedBytesReader<const N: usize>;

impl<const N: usize> ScaleReader<[u8; N]> for FixedBytesReader<N> {
    #[inline]
    fn read(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<[u8; N]> {
        rdr.read_array()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_tracking() {
        let bytes = [1, 2, 3];
        let mut rdr = ScaleCodecReader::new(&bytes);
        assert_eq!(rdr.remaining(), 3);
        assert_eq!(rdr.read_byte().expect("byte"), 1);
        rdr.skip(1).expect("skip");
        assert_eq!(rdr.position(), 2);
        assert!(rdr.has_next());
        assert_eq!(rdr.read_byte().expect("byte"), 3);
        assert!(!rdr.has_next());
        assert!(rdr.skip(1).is_err());
    }

    #[test]
    fn test_fixed_width_little_endian() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let mut rdr = ScaleCodecReader::new(&bytes);
        assert_eq!(rdr.read(&UInt16Reader).expect("u16"), 0x0201);
        assert_eq!(rdr.read(&UInt16Reader).expect("u16"), 0x0403);
        assert_eq!(rdr.read(&UInt32Reader).expect("u32"), 0x0807_0605);

        let mut rdr = ScaleCodecReader::new(&bytes);
        assert_eq!(rdr.read(&UInt64Reader).expect("u64"), 0x0807_0605_0403_0201);
    }

    #[test]
    fn test_u128() {
        let mut bytes = [0u8; 16];
        bytes[15] = 0x80;
        let mut rdr = ScaleCodecReader::new(&bytes);
        assert_eq!(rdr.read(&UInt128Reader).expect("u128"), 1u128 << 127);
    }

    #[test]
    fn test_short_read_is_malformed() {
        let mut rdr = ScaleCodecReader::new(&[0x01, 0x02, 0x03]);
        let err = rdr.read(&UInt32Reader).unwrap_err();
        assert!(matches!(err, Error::MalformedInput { .. }));
        // cursor does not move on failure
        assert_eq!(rdr.position(), 0);
    }

    #[test]
    fn test_bool() {
        let mut rdr = ScaleCodecReader::new(&[0x00, 0x01, 0x02]);
        assert!(!rdr.read(&BoolReader).expect("false"));
        assert!(rdr.read(&BoolReader).expect("true"));
        assert!(matches!(
            rdr.read(&BoolReader),
            Err(Error::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_bool_optional() {
        let mut rdr = ScaleCodecReader::new(&[0x00, 0x01, 0x02, 0x03]);
        assert_eq!(rdr.read(&BoolOptionalReader).expect("none"), None);
        assert_eq!(rdr.read(&BoolOptionalReader).expect("false"), Some(false));
        assert_eq!(rdr.read(&BoolOptionalReader).expect("true"), Some(true));
        assert!(rdr.read(&BoolOptionalReader).is_err());
    }

    #[test]
    fn test_bool_uses_tri_state_optional() {
        let mut rdr = ScaleCodecReader::new(&[0x02]);
        assert_eq!(rdr.read_optional(&BoolReader).expect("opt"), Some(true));
    }

    #[test]
    fn test_byte_array_and_string() {
        let bytes = [0x0C, b'a', b'b', b'c', 0x08, 0xC3, 0xA9];
        let mut rdr = ScaleCodecReader::new(&bytes);
        assert_eq!(rdr.read_byte_array().expect("bytes"), b"abc".to_vec());
        assert_eq!(rdr.read_string().expect("string"), "é");
    }

    #[test]
    fn test_string_invalid_utf8() {
        let mut rdr = ScaleCodecReader::new(&[0x04, 0xFF]);
        assert!(matches!(
            rdr.read_string(),
            Err(Error::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_byte_array_length_exceeds_input() {
        let mut rdr = ScaleCodecReader::new(&[0x10, 0x01]);
        assert!(rdr.read_byte_array().is_err());
    }

    #[test]
    fn test_fixed_bytes() {
        let bytes = [7u8; 64];
        let mut rdr = ScaleCodecReader::new(&bytes);
        let value: [u8; 32] = rdr.read(&FixedBytesReader::<32>).expect("32");
        assert_eq!(value, [7u8; 32]);
        assert!(rdr.read(&FixedBytesReader::<64>).is_err());
    }
}
