//! SCALE binary codec.
//!
//! The wire format is not self-describing: a value can only be decoded when
//! the caller already knows its exact shape. Shapes are described by
//! composing small strategy objects, one per type:
//!
//! | Strategy | Role |
//! |----------|------|
//! | [`ScaleReader<T>`] | cursor → `T` |
//! | [`ScaleWriter<T>`] | `T` → sink |
//!
//! Complex records are decoded by calling readers in a fixed field order on
//! a [`ScaleCodecReader`] and encoded the same way on a [`ScaleCodecWriter`].
//!
//! # Example
//!
//! ```
//! use dotwire::codec::{CompactReader, ListReader, ScaleCodecReader, UInt32Reader};
//!
//! # fn example() -> dotwire::Result<()> {
//! let bytes = [0x08, 0x01, 0x00, 0x00, 0x00, 0x04];
//! let mut rdr = ScaleCodecReader::new(&bytes);
//! let values: Vec<u32> = rdr.read(&ListReader::new(UInt32Reader))?;
//! let tail: u32 = rdr.read(&CompactReader::<u32>::new())?;
//! # let _ = (values, tail);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `compact` | Variable-length unsigned integers |
//! | `reader` | Read cursor and primitive readers |
//! | `writer` | Output sink and primitive writers |
//! | `composite` | Lists, optionals, tagged unions, combinators |
//! | `extract` | One-shot helpers over byte slices and hex strings |

// ============================================================================
// Submodules
// ============================================================================

/// Compact (variable-length) unsigned integers.
pub mod compact;

/// Lists, optionals, tagged unions and reader combinators.
pub mod composite;

/// One-shot encode/decode helpers.
pub mod extract;

/// Read cursor and primitive readers.
pub mod reader;

/// Output sink and primitive writers.
pub mod writer;

// ============================================================================
// Re-exports
// ============================================================================

pub use compact::{CompactMode, CompactReader, CompactWriter};
pub use composite::{
    ListReader, ListWriter, Map, OptionalReader, OptionalWriter, ScaleReaderExt, TaggedValue,
    UnionReader, UnionWriter,
};
pub use reader::{
    BoolOptionalReader, BoolReader, ByteArrayReader, FixedBytesReader, ScaleCodecReader,
    StringReader, UByteReader, UInt16Reader, UInt32Reader, UInt64Reader, UInt128Reader,
};
pub use writer::{
    BoolOptionalWriter, BoolWriter, ByteArrayWriter, EraWriter, FixedBytesWriter, Narrowing,
    ScaleCodecWriter, StringWriter, UByteWriter, UInt16Writer, UInt32Writer, UInt64Writer,
    UInt128Writer,
};

// ============================================================================
// Imports
// ============================================================================

use crate::error::Result;

// ============================================================================
// Strategy Traits
// ============================================================================

/// Decoding strategy for a single type.
///
/// Implementations must consume exactly the bytes of one value.
pub trait ScaleReader<T> {
    /// Reads one value from the cursor.
    fn read(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<T>;

    /// Reads an optional value.
    ///
    /// The default form is a boolean presence byte followed by the value.
    /// Types whose optional form differs on the wire override this.
    fn read_optional(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<Option<T>> {
        if rdr.read(&BoolReader)? {
            self.read(rdr).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Encoding strategy for a single type.
pub trait ScaleWriter<T: ?Sized> {
    /// Writes one value to the sink.
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &T) -> Result<()>;

    /// Writes an optional value.
    ///
    /// Mirrors [`ScaleReader::read_optional`].
    fn write_optional(&self, wrt: &mut ScaleCodecWriter, value: Option<&T>) -> Result<()> {
        match value {
            Some(value) => {
                wrt.write(&BoolWriter, &true)?;
                self.write(wrt, value)
            }
            None => wrt.write(&BoolWriter, &false),
        }
    }
}

impl<T, R: ScaleReader<T> + ?Sized> ScaleReader<T> for &R {
    #[inline]
    fn read(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<T> {
        (**self).read(rdr)
    }

    #[inline]
    fn read_optional(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<Option<T>> {
        (**self).read_optional(rdr)
    }
}

impl<T, R: ScaleReader<T> + ?Sized> ScaleReader<T> for Box<R> {
    #[inline]
    fn read(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<T> {
        (**self).read(rdr)
    }

    #[inline]
    fn read_optional(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<Option<T>> {
        (**self).read_optional(rdr)
    }
}

impl<T: ?Sized, W: ScaleWriter<T> + ?Sized> ScaleWriter<T> for &W {
    #[inline]
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &T) -> Result<()> {
        (**self).write(wrt, value)
    }

    #[inline]
    fn write_optional(&self, wrt: &mut ScaleCodecWriter, value: Option<&T>) -> Result<()> {
        (**self).write_optional(wrt, value)
    }
}

impl<T: ?Sized, W: ScaleWriter<T> + ?Sized> ScaleWriter<T> for Box<W> {
    #[inline]
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &T) -> Result<()> {
        (**self).write(wrt, value)
    }

    #[inline]
    fn write_optional(&self, wrt: &mut ScaleCodecWriter, value: Option<&T>) -> Result<()> {
        (**self).write_optional(wrt, value)
    }
}
