//! Compact (variable-length) unsigned integers.
//!
//! The two low bits of the first byte select the mode:
//!
//! | Mode | Range | Layout |
//! |------|-------|--------|
//! | `Single` | `0..=63` | 1 byte, `value << 2` |
//! | `Two` | `64..=16383` | 2 bytes LE, `(value << 2) \| 0b01` |
//! | `Four` | `16384..=2^30-1` | 4 bytes LE, `(value << 2) \| 0b10` |
//! | `BigInt` | `>= 2^30` | `((len - 4) << 2) \| 0b11`, then `len` LE bytes |
//!
//! Encoding always picks the smallest mode. Decoding trusts the mode bits it
//! finds, so a non-minimal encoding still decodes to its value.
//!
//! Values are carried as `u128`; a `BigInt` payload whose magnitude does not
//! fit 128 bits is rejected as malformed.

// ============================================================================
// Imports
// ============================================================================

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::error::{Error, Result};

use super::{ScaleCodecReader, ScaleCodecWriter, ScaleReader, ScaleWriter};

// ============================================================================
// Constants
// ============================================================================

/// Largest value encoded in `Single` mode.
const SINGLE_MAX: u128 = (1 << 6) - 1;

/// Largest value encoded in `Two` mode.
const TWO_MAX: u128 = (1 << 14) - 1;

/// Largest value encoded in `Four` mode.
const FOUR_MAX: u128 = (1 << 30) - 1;

/// Magnitude bytes implied by a `BigInt` length prefix of zero.
const BIGINT_MIN_LEN: usize = 4;

// ============================================================================
// CompactMode
// ============================================================================

/// Encoding mode of a compact integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompactMode {
    /// One byte, values `0..=63`.
    Single,
    /// Two bytes, values `64..=16383`.
    Two,
    /// Four bytes, values `16384..=2^30-1`.
    Four,
    /// Length-prefixed magnitude, values `>= 2^30`.
    BigInt,
}

impl CompactMode {
    /// Returns the minimal mode able to hold `value`.
    #[inline]
    #[must_use]
    pub const fn for_value(value: u128) -> Self {
        if value <= SINGLE_MAX {
            Self::Single
        } else if value <= TWO_MAX {
            Self::Two
        } else if value <= FOUR_MAX {
            Self::Four
        } else {
            Self::BigInt
        }
    }

    /// Returns the mode encoded in the low two bits of a prefix byte.
    #[inline]
    #[must_use]
    pub const fn from_prefix(byte: u8) -> Self {
        match byte & 0b11 {
            0b00 => Self::Single,
            0b01 => Self::Two,
            0b10 => Self::Four,
            _ => Self::BigInt,
        }
    }

    /// Returns the two mode bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Single => 0b00,
            Self::Two => 0b01,
            Self::Four => 0b10,
            Self::BigInt => 0b11,
        }
    }
}

impl fmt::Display for CompactMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Single => "single",
            Self::Two => "two",
            Self::Four => "four",
            Self::BigInt => "bigint",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Raw Encode / Decode
// ============================================================================

/// Writes `value` as a compact integer using the minimal mode.
pub fn encode(wrt: &mut ScaleCodecWriter, value: u128) {
    let mode = CompactMode::for_value(value);
    match mode {
        CompactMode::Single => wrt.write_byte(((value as u8) << 2) | mode.bits()),
        CompactMode::Two => {
            let word = ((value as u16) << 2) | u16::from(mode.bits());
            wrt.write_raw(&word.to_le_bytes());
        }
        CompactMode::Four => {
            let word = ((value as u32) << 2) | u32::from(mode.bits());
            wrt.write_raw(&word.to_le_bytes());
        }
        CompactMode::BigInt => {
            let bytes = value.to_le_bytes();
            let len = magnitude_len(value);
            wrt.write_byte((((len - BIGINT_MIN_LEN) as u8) << 2) | mode.bits());
            wrt.write_raw(&bytes[..len]);
        }
    }
}

/// Reads a compact integer, honoring whatever mode the prefix declares.
///
/// # Errors
///
/// - [`Error::MalformedInput`] if fewer bytes remain than the mode needs
/// - [`Error::MalformedInput`] if a `BigInt` magnitude exceeds 128 bits
pub fn decode(rdr: &mut ScaleCodecReader<'_>) -> Result<u128> {
    let first = rdr.read_byte()?;
    match CompactMode::from_prefix(first) {
        CompactMode::Single => Ok(u128::from(first >> 2)),
        CompactMode::Two => {
            let word = u16::from_le_bytes([first, rdr.read_byte()?]);
            Ok(u128::from(word >> 2))
        }
        CompactMode::Four => {
            let rest: [u8; 3] = rdr.read_array()?;
            let word = u32::from_le_bytes([first, rest[0], rest[1], rest[2]]);
            Ok(u128::from(word >> 2))
        }
        CompactMode::BigInt => {
            let len = usize::from(first >> 2) + BIGINT_MIN_LEN;
            let magnitude = rdr.read_bytes(len)?;
            let (low, high) = magnitude.split_at(len.min(16));
            if high.iter().any(|b| *b != 0) {
                return Err(Error::malformed(format!(
                    "compact magnitude of {len} bytes exceeds 128 bits"
                )));
            }
            let mut buf = [0u8; 16];
            buf[..low.len()].copy_from_slice(low);
            Ok(u128::from_le_bytes(buf))
        }
    }
}

/// Minimal number of bytes holding the magnitude of `value`.
#[inline]
fn magnitude_len(value: u128) -> usize {
    let bits = (u128::BITS - value.leading_zeros()) as usize;
    bits.div_ceil(8).max(BIGINT_MIN_LEN)
}

// ============================================================================
// CompactReader
// ============================================================================

/// Reads a compact integer into `T`.
///
/// Fails with [`Error::MalformedInput`] when the decoded value does not fit.
pub struct CompactReader<T>(PhantomData<fn() -> T>);

impl<T> CompactReader<T> {
    /// Creates a compact reader for `T`.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for CompactReader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CompactReader<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CompactReader<T> {}

impl<T> fmt::Debug for CompactReader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompactReader<{}>", type_name::<T>())
    }
}

impl<T: TryFrom<u128>> ScaleReader<T> for CompactReader<T> {
    fn read(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<T> {
        let value = decode(rdr)?;
        T::try_from(value).map_err(|_| {
            Error::malformed(format!(
                "compact value {value} does not fit {}",
                type_name::<T>()
            ))
        })
    }
}

// ============================================================================
// CompactWriter
// ============================================================================

/// Writes `T` as a compact integer.
pub struct CompactWriter<T>(PhantomData<fn(T)>);

impl<T> CompactWriter<T> {
    /// Creates a compact writer for `T`.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for CompactWriter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CompactWriter<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CompactWriter<T> {}

impl<T> fmt::Debug for CompactWriter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompactWriter<{}>", type_name::<T>())
    }
}

impl<T: Copy + Into<u128>> ScaleWriter<T> for CompactWriter<T> {
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &T) -> Result<()> {
        encode(wrt, (*value).into());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn encoded(value: u128) -> Vec<u8> {
        let mut wrt = ScaleCodecWriter::new();
        encode(&mut wrt, value);
        wrt.into_bytes()
    }

    fn decoded(bytes: &[u8]) -> Result<u128> {
        let mut rdr = ScaleCodecReader::new(bytes);
        decode(&mut rdr)
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(1), vec![0x04]);
        assert_eq!(encoded(63), vec![0xFC]);
        assert_eq!(encoded(64), vec![0x01, 0x01]);
        assert_eq!(encoded(16383), vec![0xFD, 0xFF]);
        assert_eq!(encoded(16384), vec![0x02, 0x00, 0x01, 0x00]);
        assert_eq!(encoded((1 << 30) - 1), vec![0xFE, 0xFF, 0xFF, 0xFF]);
        assert_eq!(encoded(1 << 30), vec![0x03, 0x00, 0x00, 0x00, 0x40]);
    }

    #[test]
    fn test_mode_boundaries() {
        assert_eq!(CompactMode::for_value(63), CompactMode::Single);
        assert_eq!(CompactMode::for_value(64), CompactMode::Two);
        assert_eq!(CompactMode::for_value(16383), CompactMode::Two);
        assert_eq!(CompactMode::for_value(16384), CompactMode::Four);
        assert_eq!(CompactMode::for_value((1 << 30) - 1), CompactMode::Four);
        assert_eq!(CompactMode::for_value(1 << 30), CompactMode::BigInt);
    }

    #[test]
    fn test_boundaries_round_trip() {
        for value in [0, 63, 64, 16383, 16384, (1 << 30) - 1, 1 << 30] {
            assert_eq!(decoded(&encoded(value)).expect("decode"), value);
        }
    }

    #[test]
    fn test_bigint_uses_minimal_length() {
        // 2^100 needs 13 magnitude bytes
        let bytes = encoded(1 << 100);
        assert_eq!(bytes.len(), 14);
        assert_eq!(bytes[0], ((13 - 4) << 2) | 0b11);
        assert_eq!(decoded(&bytes).expect("decode"), 1 << 100);
    }

    #[test]
    fn test_u128_max_round_trip() {
        let bytes = encoded(u128::MAX);
        assert_eq!(bytes[0], ((16 - 4) << 2) | 0b11);
        assert_eq!(decoded(&bytes).expect("decode"), u128::MAX);
    }

    #[test]
    fn test_decode_accepts_non_minimal_mode() {
        // value 1 in two-byte mode
        assert_eq!(decoded(&[0x05, 0x00]).expect("decode"), 1);
    }

    #[test]
    fn test_decode_short_input() {
        assert!(matches!(decoded(&[]), Err(Error::MalformedInput { .. })));
        assert!(matches!(decoded(&[0x01]), Err(Error::MalformedInput { .. })));
        assert!(matches!(
            decoded(&[0x02, 0x00]),
            Err(Error::MalformedInput { .. })
        ));
        assert!(matches!(
            decoded(&[0x03, 0x00, 0x00]),
            Err(Error::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_oversized_magnitude() {
        let mut bytes = vec![((17 - 4) << 2) | 0b11];
        bytes.extend(std::iter::repeat_n(0xFF, 17));
        assert!(matches!(decoded(&bytes), Err(Error::MalformedInput { .. })));
    }

    #[test]
    fn test_decode_zero_padded_long_magnitude() {
        let mut bytes = vec![((20 - 4) << 2) | 0b11, 0x01];
        bytes.extend(std::iter::repeat_n(0x00, 19));
        assert_eq!(decoded(&bytes).expect("decode"), 1);
    }

    #[test]
    fn test_typed_reader_overflow() {
        let bytes = encoded(u128::from(u32::MAX) + 1);
        let mut rdr = ScaleCodecReader::new(&bytes);
        let result = rdr.read(&CompactReader::<u32>::new());
        assert!(matches!(result, Err(Error::MalformedInput { .. })));
    }

    #[test]
    fn test_typed_writer() {
        let mut wrt = ScaleCodecWriter::new();
        wrt.write(&CompactWriter::<u64>::new(), &101).expect("write");
        assert_eq!(wrt.as_bytes(), &[0x95, 0x01]);
    }

    proptest! {
        #[test]
        fn prop_round_trip(value in any::<u128>()) {
            let bytes = encoded(value);
            prop_assert_eq!(decoded(&bytes).expect("decode"), value);
            prop_assert_eq!(CompactMode::from_prefix(bytes[0]), CompactMode::for_value(value));
        }

        #[test]
        fn prop_u32_round_trip(value in any::<u32>()) {
            let mut wrt = ScaleCodecWriter::new();
            wrt.write(&CompactWriter::<u32>::new(), &value).expect("write");
            let bytes = wrt.into_bytes();
            let mut rdr = ScaleCodecReader::new(&bytes);
            prop_assert_eq!(rdr.read(&CompactReader::<u32>::new()).expect("read"), value);
            prop_assert!(!rdr.has_next());
        }
    }
}
