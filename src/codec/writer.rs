//! Output sink and primitive writers.

// ============================================================================
// Imports
// ============================================================================

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::error::{Error, Result};

use super::ScaleWriter;
use super::compact;

// ============================================================================
// ScaleCodecWriter
// ============================================================================

/// Growable output buffer for SCALE encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaleCodecWriter {
    out: Vec<u8>,
}

impl ScaleCodecWriter {
    /// Creates an empty writer.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { out: Vec::new() }
    }

    /// Creates an empty writer with preallocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
        }
    }

    /// Writes one value using `writer`.
    #[inline]
    pub fn write<T: ?Sized, W: ScaleWriter<T> + ?Sized>(
        &mut self,
        writer: &W,
        value: &T,
    ) -> Result<()> {
        writer.write(self, value)
    }

    /// Writes an optional value using `writer`'s optional form.
    #[inline]
    pub fn write_optional<T: ?Sized, W: ScaleWriter<T> + ?Sized>(
        &mut self,
        writer: &W,
        value: Option<&T>,
    ) -> Result<()> {
        writer.write_optional(self, value)
    }

    /// Appends one already-encoded byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.out.push(byte);
    }

    /// Appends already-encoded bytes as-is.
    #[inline]
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    /// Writes `value` as a compact integer.
    #[inline]
    pub fn write_compact(&mut self, value: u128) {
        compact::encode(self, value);
    }

    /// Writes a compact length prefix followed by `bytes`.
    pub fn write_byte_array(&mut self, bytes: &[u8]) {
        self.write_compact(bytes.len() as u128);
        self.write_raw(bytes);
    }

    /// Returns the bytes written so far.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    /// Returns the number of bytes written.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// Returns `true` if nothing was written.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Consumes the writer and returns the encoded bytes.
    #[inline]
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.out
    }
}

// ============================================================================
// Fixed-Width Integers
// ============================================================================

/// Writes an unsigned byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct UByteWriter;

impl ScaleWriter<u8> for UByteWriter {
    #[inline]
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &u8) -> Result<()> {
        wrt.write_byte(*value);
        Ok(())
    }
}

macro_rules! le_writer {
    ($(#[$doc:meta])* $name:ident, $ty:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl ScaleWriter<$ty> for $name {
            #[inline]
            fn write(&self, wrt: &mut ScaleCodecWriter, value: &$ty) -> Result<()> {
                wrt.write_raw(&value.to_le_bytes());
                Ok(())
            }
        }
    };
}

le_writer!(
    /// Writes a little-endian `u16`.
    UInt16Writer,
    u16
);
le_writer!(
    /// Writes a little-endian `u32`.
    UInt32Writer,
    u32
);
le_writer!(
    /// Writes a little-endian `u64`.
    UInt64Writer,
    u64
);
le_writer!(
    /// Writes a little-endian `u128`.
    UInt128Writer,
    u128
);

/// Adapts an unsigned writer to wider or signed input.
///
/// Values outside the range of `U` (negative numbers in particular) fail
/// with [`Error::Encoding`] instead of being truncated.
///
/// ```
/// use dotwire::codec::{Narrowing, ScaleCodecWriter, UInt32Writer};
///
/// let writer: Narrowing<UInt32Writer, u32> = Narrowing::new(UInt32Writer);
/// let mut wrt = ScaleCodecWriter::new();
/// assert!(wrt.write(&writer, &-1i64).is_err());
/// ```
pub struct Narrowing<W, U> {
    inner: W,
    _target: PhantomData<fn(U)>,
}

impl<W, U> Narrowing<W, U> {
    /// Wraps `inner`.
    #[inline]
    #[must_use]
    pub const fn new(inner: W) -> Self {
        Self {
            inner,
            _target: PhantomData,
        }
    }
}

impl<W: fmt::Debug, U> fmt::Debug for Narrowing<W, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Narrowing")
            .field("inner", &self.inner)
            .field("target", &type_name::<U>())
            .finish()
    }
}

impl<W, U, S> ScaleWriter<S> for Narrowing<W, U>
where
    W: ScaleWriter<U>,
    U: TryFrom<S>,
    S: Copy + fmt::Display,
{
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &S) -> Result<()> {
        let narrowed = U::try_from(*value).map_err(|_| {
            Error::encoding(format!(
                "value {value} is not representable as {}",
                type_name::<U>()
            ))
        })?;
        self.inner.write(wrt, &narrowed)
    }
}

// ============================================================================
// Booleans
// ============================================================================

/// Writes a boolean as `0x00`/`0x01`.
///
/// Its optional form is the tri-state byte of [`BoolOptionalWriter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolWriter;

impl ScaleWriter<bool> for BoolWriter {
    #[inline]
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &bool) -> Result<()> {
        wrt.write_byte(u8::from(*value));
        Ok(())
    }

    #[inline]
    fn write_optional(&self, wrt: &mut ScaleCodecWriter, value: Option<&bool>) -> Result<()> {
        BoolOptionalWriter.write(wrt, &value.copied())
    }
}

/// Writes an optional boolean as one byte.
///
/// `None` → `0x00`, `Some(false)` → `0x01`, `Some(true)` → `0x02`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolOptionalWriter;

impl ScaleWriter<Option<bool>> for BoolOptionalWriter {
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &Option<bool>) -> Result<()> {
        let byte = match value {
            None => 0x00,
            Some(false) => 0x01,
            Some(true) => 0x02,
        };
        wrt.write_byte(byte);
        Ok(())
    }
}

// ============================================================================
// Byte Strings
// ============================================================================

/// Writes a compact-length-prefixed byte array.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteArrayWriter;

impl ScaleWriter<[u8]> for ByteArrayWriter {
    #[inline]
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &[u8]) -> Result<()> {
        wrt.write_byte_array(value);
        Ok(())
    }
}

impl ScaleWriter<Vec<u8>> for ByteArrayWriter {
    #[inline]
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &Vec<u8>) -> Result<()> {
        wrt.write_byte_array(value);
        Ok(())
    }
}

/// Writes a compact-length-prefixed UTF-8 string.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringWriter;

impl ScaleWriter<str> for StringWriter {
    #[inline]
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &str) -> Result<()> {
        wrt.write_byte_array(value.as_bytes());
        Ok(())
    }
}

impl ScaleWriter<String> for StringWriter {
    #[inline]
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &String) -> Result<()> {
        wrt.write_byte_array(value.as_bytes());
        Ok(())
    }
}

/// Writes exactly `N` raw bytes with no length prefix.
///
/// Slices of any other length fail with [`Error::Encoding`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedBytesWriter<const N: usize>;

impl<const N: usize> ScaleWriter<[u8]> for FixedBytesWriter<N> {
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &[u8]) -> Result<()> {
        if value.len() != N {
            return Err(Error::encoding(format!(
                "expected {N} bytes, got {}",
                value.len()
            )));
        }
        wrt.write_raw(value);
        Ok(())
    }
}

impl<const N: usize> ScaleWriter<[u8; N]> for FixedBytesWriter<N> {
    #[inline]
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &[u8; N]) -> Result<()> {
        wrt.write_raw(value);
        Ok(())
    }
}

// ============================================================================
// Era
// ============================================================================

/// Writes a transaction era.
///
/// Immortal (`0`) is the single byte `0x00`; mortal eras are a `u16`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EraWriter;

impl ScaleWriter<u16> for EraWriter {
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &u16) -> Result<()> {
        if *value == 0 {
            wrt.write_byte(0x00);
            Ok(())
        } else {
            UInt16Writer.write(wrt, value)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
