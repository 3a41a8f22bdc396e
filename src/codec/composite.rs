//! Composite strategies built from other strategies.
//!
//! | Strategy | Wire form |
//! |----------|-----------|
//! | [`ListReader`] / [`ListWriter`] | compact count, then each item |
//! | [`OptionalReader`] / [`OptionalWriter`] | the inner strategy's optional form |
//! | [`UnionReader`] / [`UnionWriter`] | one tag byte, then the tagged variant |
//! | [`Map`] | same bytes as the inner reader, converted value |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::marker::PhantomData;

use crate::error::{Error, Result};

use super::{ScaleCodecReader, ScaleCodecWriter, ScaleReader, ScaleWriter};

// ============================================================================
// List
// ============================================================================

/// Reads a compact count followed by that many items.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListReader<R> {
    item: R,
}

impl<R> ListReader<R> {
    /// Creates a list reader over `item`.
    #[inline]
    #[must_use]
    pub const fn new(item: R) -> Self {
        Self { item }
    }
}

impl<T, R: ScaleReader<T>> ScaleReader<Vec<T>> for ListReader<R> {
    fn read(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<Vec<T>> {
        let count = rdr.read_compact_len()?;
        // every item takes at least one byte unless it is zero-sized
        let mut items = Vec::with_capacity(count.min(rdr.remaining()));
        for _ in 0..count {
            items.push(self.item.read(rdr)?);
        }
        Ok(items)
    }
}

/// Writes a compact count followed by each item.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListWriter<W> {
    item: W,
}

impl<W> ListWriter<W> {
    /// Creates a list writer over `item`.
    #[inline]
    #[must_use]
    pub const fn new(item: W) -> Self {
        Self { item }
    }
}

impl<T, W: ScaleWriter<T>> ScaleWriter<[T]> for ListWriter<W> {
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &[T]) -> Result<()> {
        wrt.write_compact(value.len() as u128);
        value.iter().try_for_each(|item| self.item.write(wrt, item))
    }
}

impl<T, W: ScaleWriter<T>> ScaleWriter<Vec<T>> for ListWriter<W> {
    #[inline]
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &Vec<T>) -> Result<()> {
        ScaleWriter::<[T]>::write(self, wrt, value.as_slice())
    }
}

// ============================================================================
// Optional
// ============================================================================

/// Reads `Option<T>` using the inner reader's optional form.
///
/// For most types that is a presence byte followed by the value; booleans
/// use a single tri-state byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalReader<R> {
    inner: R,
}

impl<R> OptionalReader<R> {
    /// Creates an optional reader over `inner`.
    #[inline]
    #[must_use]
    pub const fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<T, R: ScaleReader<T>> ScaleReader<Option<T>> for OptionalReader<R> {
    #[inline]
    fn read(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<Option<T>> {
        self.inner.read_optional(rdr)
    }
}

/// Writes `Option<T>` using the inner writer's optional form.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalWriter<W> {
    inner: W,
}

impl<W> OptionalWriter<W> {
    /// Creates an optional writer over `inner`.
    #[inline]
    #[must_use]
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<T, W: ScaleWriter<T>> ScaleWriter<Option<T>> for OptionalWriter<W> {
    #[inline]
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &Option<T>) -> Result<()> {
        self.inner.write_optional(wrt, value.as_ref())
    }
}

// ============================================================================
// TaggedValue
// ============================================================================

/// A union value: the 0-based variant index plus its payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaggedValue<T> {
    /// Index into the declared variants.
    pub index: u8,
    /// Decoded payload of that variant.
    pub value: T,
}

impl<T> TaggedValue<T> {
    /// Creates a tagged value.
    #[inline]
    #[must_use]
    pub const fn new(index: u8, value: T) -> Self {
        Self { index, value }
    }
}

// ============================================================================
// Union
// ============================================================================

/// Boxed reader usable as a union variant.
type VariantReader<T> = Box<dyn ScaleReader<T> + Send + Sync>;

/// Boxed writer usable as a union variant.
type VariantWriter<T> = Box<dyn ScaleWriter<T> + Send + Sync>;

/// Reads a tag byte and dispatches to the matching variant reader.
///
/// ```
/// use dotwire::codec::{CompactReader, ScaleCodecReader, UInt32Reader, UnionReader};
///
/// let union = UnionReader::new()
///     .variant(UInt32Reader)
///     .variant(UInt32Reader)
///     .variant(CompactReader::<u32>::new());
///
/// let bytes = [0x02, 0x95, 0x01];
/// let tagged = ScaleCodecReader::new(&bytes).read(&union).unwrap();
/// assert_eq!((tagged.index, tagged.value), (2, 101));
/// ```
pub struct UnionReader<T> {
    variants: Vec<VariantReader<T>>,
}

impl<T> UnionReader<T> {
    /// Creates a union with no variants.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            variants: Vec::new(),
        }
    }

    /// Appends the next variant.
    #[must_use]
    pub fn variant<R>(mut self, reader: R) -> Self
    where
        R: ScaleReader<T> + Send + Sync + 'static,
    {
        self.variants.push(Box::new(reader));
        self
    }

    /// Returns the number of declared variants.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Returns `true` if no variants are declared.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl<T> Default for UnionReader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for UnionReader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionReader")
            .field("variants", &self.variants.len())
            .finish()
    }
}

impl<T> ScaleReader<TaggedValue<T>> for UnionReader<T> {
    fn read(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<TaggedValue<T>> {
        let index = rdr.read_byte()?;
        let reader = self
            .variants
            .get(usize::from(index))
            .ok_or_else(|| Error::unknown_variant(index, self.variants.len()))?;
        Ok(TaggedValue::new(index, reader.read(rdr)?))
    }
}

/// Writes a tag byte followed by the payload through the tagged variant.
pub struct UnionWriter<T> {
    variants: Vec<VariantWriter<T>>,
}

impl<T> UnionWriter<T> {
    /// Creates a union with no variants.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            variants: Vec::new(),
        }
    }

    /// Appends the next variant.
    #[must_use]
    pub fn variant<W>(mut self, writer: W) -> Self
    where
        W: ScaleWriter<T> + Send + Sync + 'static,
    {
        self.variants.push(Box::new(writer));
        self
    }

    /// Returns the number of declared variants.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Returns `true` if no variants are declared.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl<T> Default for UnionWriter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for UnionWriter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionWriter")
            .field("variants", &self.variants.len())
            .finish()
    }
}

impl<T> ScaleWriter<TaggedValue<T>> for UnionWriter<T> {
    fn write(&self, wrt: &mut ScaleCodecWriter, value: &TaggedValue<T>) -> Result<()> {
        let writer = self
            .variants
            .get(usize::from(value.index))
            .ok_or_else(|| Error::unknown_variant(value.index, self.variants.len()))?;
        wrt.write_byte(value.index);
        writer.write(wrt, &value.value)
    }
}

// ============================================================================
// Map
// ============================================================================

/// Reader that converts the inner reader's output.
///
/// Created with [`ScaleReaderExt::map`].
pub struct Map<R, F, A> {
    inner: R,
    f: F,
    _source: PhantomData<fn() -> A>,
}

impl<R: fmt::Debug, F, A> fmt::Debug for Map<R, F, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map").field("inner", &self.inner).finish()
    }
}

impl<R, F, A, B> ScaleReader<B> for Map<R, F, A>
where
    R: ScaleReader<A>,
    F: Fn(A) -> B,
{
    #[inline]
    fn read(&self, rdr: &mut ScaleCodecReader<'_>) -> Result<B> {
        self.inner.read(rdr).map(&self.f)
    }
}

/// Combinators available on every reader.
pub trait ScaleReaderExt<T>: ScaleReader<T> + Sized {
    /// Converts each decoded value with `f`.
    fn map<F, B>(self, f: F) -> Map<Self, F, T>
    where
        F: Fn(T) -> B,
    {
        Map {
            inner: self,
            f,
            _source: PhantomData,
        }
    }
}

impl<T, R: ScaleReader<T>> ScaleReaderExt<T> for R {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::codec::{
        BoolReader, BoolWriter, CompactReader, CompactWriter, StringReader, StringWriter,
        UInt16Reader, UInt16Writer, UInt32Reader, UInt32Writer,
    };

    fn union_reader() -> UnionReader<u32> {
        UnionReader::new()
            .variant(UInt32Reader)
            .variant(UInt32Reader)
            .variant(CompactReader::<u32>::new())
    }

    #[test]
    fn test_union_compact_variant() {
        let mut wrt = ScaleCodecWriter::new();
        wrt.write_byte(0x02);
        wrt.write_compact(101);
        let bytes = wrt.into_bytes();

        let tagged = ScaleCodecReader::new(&bytes)
            .read(&union_reader())
            .expect("decode");
        assert_eq!(tagged, TaggedValue::new(2, 101));
    }

    #[test]
    fn test_union_fixed_variant() {
        let bytes = [0x01, 0x2A, 0x00, 0x00, 0x00];
        let tagged = ScaleCodecReader::new(&bytes)
            .read(&union_reader())
            .expect("decode");
        assert_eq!(tagged, TaggedValue::new(1, 42));
    }

    #[test]
    fn test_union_unknown_variant() {
        let bytes = [0x03, 0x00];
        let err = ScaleCodecReader::new(&bytes)
            .read(&union_reader())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownVariant {
                index: 3,
                variants: 3
            }
        ));
    }

    #[test]
    fn test_union_writer() {
        let writer = UnionWriter::new()
            .variant(UInt32Writer)
            .variant(CompactWriter::<u32>::new());
        let mut wrt = ScaleCodecWriter::new();
        wrt.write(&writer, &TaggedValue::new(1, 101)).expect("write");
        assert_eq!(wrt.as_bytes(), &[0x01, 0x95, 0x01]);

        let err = wrt.write(&writer, &TaggedValue::new(2, 1)).unwrap_err();
        assert!(matches!(err, Error::UnknownVariant { index: 2, .. }));
        assert_eq!(writer.len(), 2);
    }

    #[test]
    fn test_list_of_union() {
        let reader = ListReader::new(union_reader());
        let bytes = [0x08, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x04];
        let values = ScaleCodecReader::new(&bytes).read(&reader).expect("list");
        assert_eq!(values, vec![TaggedValue::new(0, 1), TaggedValue::new(2, 1)]);
    }

    #[test]
    fn test_list_truncated() {
        // claims 4 items, carries 1
        let bytes = [0x10, 0x01, 0x00];
        let result = ScaleCodecReader::new(&bytes).read(&ListReader::new(UInt16Reader));
        assert!(matches!(result, Err(Error::MalformedInput { .. })));
    }

    #[test]
    fn test_list_of_strings() {
        let values = vec!["a".to_string(), "bc".to_string()];
        let mut wrt = ScaleCodecWriter::new();
        wrt.write(&ListWriter::new(StringWriter), &values).expect("write");
        assert_eq!(wrt.as_bytes(), &[0x08, 0x04, b'a', 0x08, b'b', b'c']);

        let bytes = wrt.into_bytes();
        let decoded = ScaleCodecReader::new(&bytes)
            .read(&ListReader::new(StringReader))
            .expect("read");
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_optional_generic_and_bool() {
        let mut wrt = ScaleCodecWriter::new();
        wrt.write(&OptionalWriter::new(UInt16Writer), &Some(7))
            .expect("some");
        wrt.write(&OptionalWriter::new(BoolWriter), &Some(true))
            .expect("bool");
        wrt.write(&OptionalWriter::new(UInt16Writer), &None)
            .expect("none");
        assert_eq!(wrt.as_bytes(), &[0x01, 0x07, 0x00, 0x02, 0x00]);

        let bytes = wrt.into_bytes();
        let mut rdr = ScaleCodecReader::new(&bytes);
        assert_eq!(
            rdr.read(&OptionalReader::new(UInt16Reader)).expect("some"),
            Some(7)
        );
        assert_eq!(
            rdr.read(&OptionalReader::new(BoolReader)).expect("bool"),
            Some(true)
        );
        assert_eq!(
            rdr.read(&OptionalReader::new(UInt16Reader)).expect("none"),
            None
        );
    }

    #[test]
    fn test_optional_invalid_presence_byte() {
        let result = ScaleCodecReader::new(&[0x05, 0x00]).read(&OptionalReader::new(UInt16Reader));
        assert!(matches!(result, Err(Error::MalformedInput { .. })));
    }

    #[test]
    fn test_map_combinator() {
        let reader = UnionReader::new()
            .variant(UInt16Reader.map(u32::from))
            .variant(UInt32Reader);
        let bytes = [0x00, 0x05, 0x00];
        let tagged = ScaleCodecReader::new(&bytes).read(&reader).expect("read");
        assert_eq!(tagged.value, 5u32);
    }

    proptest! {
        #[test]
        fn prop_list_round_trip(values in proptest::collection::vec(any::<u32>(), 0..64)) {
            let mut wrt = ScaleCodecWriter::new();
            wrt.write(&ListWriter::new(CompactWriter::<u32>::new()), &values).expect("write");
            let bytes = wrt.into_bytes();
            let decoded = ScaleCodecReader::new(&bytes)
                .read(&ListReader::new(CompactReader::<u32>::new()))
                .expect("read");
            prop_assert_eq!(decoded, values);
        }

        #[test]
        fn prop_optional_string_round_trip(value in proptest::option::of(".{0,40}")) {
            let mut wrt = ScaleCodecWriter::new();
            wrt.write(&OptionalWriter::new(StringWriter), &value).expect("write");
            let bytes = wrt.into_bytes();
            let decoded = ScaleCodecReader::new(&bytes)
                .read(&OptionalReader::new(StringReader))
                .expect("read");
            prop_assert_eq!(decoded, value);
        }
    }
}
