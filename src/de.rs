//! Decoding engine.
//!
//! A value is decoded by its [`Decode`] impl pulling data out of a
//! [`Decoder`]. Before a decoder is handed out, the tag read from the stream
//! has been checked against the [`Shape`] the value declares; there is no
//! coercion between tags.
//!
//! # Quick Start
//!
//! ```
//! use shaped_nbt::{from_slice_be, nbt_record, to_vec_be};
//!
//! nbt_record! {
//!     #[derive(Debug, PartialEq)]
//!     struct Item {
//!         id: String,
//!         count: i8,
//!     }
//! }
//!
//! let item = Item { id: "minecraft:stone".into(), count: 64 };
//! let bytes = to_vec_be(&item).unwrap();
//! let back: Item = from_slice_be(&bytes).unwrap();
//! assert_eq!(back, item);
//! ```
//!
//! # Error Handling
//!
//! Decoding can fail with these errors:
//! - [`Error::UnknownTag`] - A tag id outside `0..=12`
//! - [`Error::MalformedStream`] - Truncated data, negative lengths, a bad root
//! - [`Error::TagShapeMismatch`] - A tag that cannot satisfy the expected shape
//! - [`Error::UnknownField`] / [`Error::DuplicateField`] - Compound names that do not fit the record
//! - [`Error::ArityMismatch`] - A compound with more or fewer fields than the record
//! - [`Error::ElementTypeMismatch`] - A list element tag that cannot satisfy the element shape
//! - [`Error::DepthExceeded`] - Nesting deeper than [`Config::max_depth`]

use std::{collections::HashSet, io::Read, marker::PhantomData};

use tracing::{debug, trace};
use zerocopy::{FromBytes, byteorder};

use crate::{
    ByteOrder, Config, Error, Field, Malformed, Result, ScalarKind, Schema, SequenceForm, Shape,
    ShapeFn, ShapeKind, TagID, cold_path,
    util::{MAX_PREALLOC, read_block, read_len, read_string, read_tag},
};

/// Value consumption capability: how a type pulls itself out of a [`Decoder`].
pub trait Decode: Schema + Sized {
    fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self>;

    /// Decodes a whole sequence of values.
    ///
    /// The default pulls elements one by one. Byte, int and long scalars
    /// override it to read compact arrays as a single block.
    fn decode_vec<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Vec<Self>> {
        decoder.read_list()
    }
}

/// Decoder for one value whose tag has been read and validated.
pub struct Decoder<'r, R: Read, O: ByteOrder> {
    reader: &'r mut R,
    tag: TagID,
    shape: Shape,
    config: Config,
    depth: usize,
    marker: PhantomData<O>,
}

macro_rules! read_number {
    ($name:ident, $ty:ty, $wire:ident, $kind:ident, $size:literal) => {
        #[inline]
        pub fn $name(self) -> Result<$ty> {
            self.expect(ScalarKind::$kind)?;
            let mut buf = [0u8; $size];
            self.reader.read_exact(&mut buf)?;
            Ok(byteorder::$wire::<O>::from_bytes(buf).get())
        }
    };
}

impl<'r, R: Read, O: ByteOrder> Decoder<'r, R, O> {
    pub(crate) fn new(
        reader: &'r mut R,
        tag: TagID,
        shape: Shape,
        config: Config,
        depth: usize,
    ) -> Self {
        Self {
            reader,
            tag,
            shape,
            config,
            depth,
            marker: PhantomData,
        }
    }

    /// The tag read from the stream for this value.
    pub fn tag(&self) -> TagID {
        self.tag
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    fn expect(&self, kind: ScalarKind) -> Result<()> {
        if self.tag == TagID::for_scalar(kind) {
            Ok(())
        } else {
            cold_path();
            Err(Error::TagShapeMismatch {
                tag: self.tag,
                expected: ShapeKind::Scalar(kind),
            })
        }
    }

    fn mismatch(&self) -> Error {
        cold_path();
        Error::TagShapeMismatch {
            tag: self.tag,
            expected: self.shape.kind(),
        }
    }

    fn nested_depth(&self) -> Result<usize> {
        let depth = self.depth + 1;
        if depth > self.config.max_depth {
            cold_path();
            debug!(limit = self.config.max_depth, "decode depth limit reached");
            return Err(Error::DepthExceeded(self.config.max_depth));
        }
        Ok(depth)
    }

    #[inline]
    pub fn read_i8(self) -> Result<i8> {
        self.expect(ScalarKind::Byte)?;
        let mut buf = [0u8; 1];
        self.reader.read_exact(&mut buf)?;
        Ok(buf[0] as i8)
    }

    #[inline]
    pub fn read_bool(self) -> Result<bool> {
        Ok(self.read_i8()? != 0)
    }

    read_number!(read_i16, i16, I16, Short, 2);
    read_number!(read_i32, i32, I32, Int, 4);
    read_number!(read_i64, i64, I64, Long, 8);
    read_number!(read_f32, f32, F32, Float, 4);
    read_number!(read_f64, f64, F64, Double, 8);

    pub fn read_string(self) -> Result<String> {
        self.expect(ScalarKind::String)?;
        read_string::<O>(self.reader, self.config.string_encoding)
    }

    /// Reads a `ByteArray` as raw bytes, or a `List` of `Byte` element by element.
    pub fn read_bytes(self) -> Result<Vec<u8>> {
        match self.tag {
            TagID::ByteArray => {
                let len = read_len::<O>(self.reader)? as usize;
                read_block(self.reader, len)
            }
            _ => self.read_list(),
        }
    }

    pub fn read_byte_array(self) -> Result<Vec<i8>> {
        Ok(self
            .read_bytes()?
            .into_iter()
            .map(|byte| byte as i8)
            .collect())
    }

    /// Reads an `IntArray` as one block, or a `List` of `Int` element by element.
    pub fn read_int_array(self) -> Result<Vec<i32>> {
        match self.tag {
            TagID::IntArray => {
                let block = self.read_array_block(4)?;
                let values = <[byteorder::I32<O>]>::ref_from_bytes(&block)
                    .map_err(|_| Error::MalformedStream(Malformed::UnexpectedEof))?;
                Ok(values.iter().map(|value| value.get()).collect())
            }
            _ => self.read_list(),
        }
    }

    /// Reads a `LongArray` as one block, or a `List` of `Long` element by element.
    pub fn read_long_array(self) -> Result<Vec<i64>> {
        match self.tag {
            TagID::LongArray => {
                let block = self.read_array_block(8)?;
                let values = <[byteorder::I64<O>]>::ref_from_bytes(&block)
                    .map_err(|_| Error::MalformedStream(Malformed::UnexpectedEof))?;
                Ok(values.iter().map(|value| value.get()).collect())
            }
            _ => self.read_list(),
        }
    }

    fn read_array_block(self, width: usize) -> Result<Vec<u8>> {
        let len = read_len::<O>(self.reader)? as usize;
        let bytes = len.checked_mul(width).ok_or(Error::LengthOverflow(len))?;
        read_block(self.reader, bytes)
    }

    /// Reads every element of a sequence through the generic element path.
    pub fn read_list<T: Decode>(self) -> Result<Vec<T>> {
        let mut list = self.begin_list()?;
        let mut items = Vec::with_capacity((list.len() as usize).min(MAX_PREALLOC));
        while let Some(item) = list.next_element()? {
            items.push(item);
        }
        Ok(items)
    }

    /// Starts decoding a record compound.
    pub fn begin_compound(self) -> Result<CompoundDecoder<'r, R, O>> {
        let Shape::Record(fields) = self.shape else {
            return Err(self.mismatch());
        };
        if self.tag != TagID::Compound {
            return Err(self.mismatch());
        }
        let depth = self.nested_depth()?;
        Ok(CompoundDecoder {
            reader: self.reader,
            fields,
            seen: vec![false; fields.len()],
            decoded: 0,
            state: FieldState::AwaitingField,
            config: self.config,
            depth,
            marker: PhantomData,
        })
    }

    /// Starts decoding a compound with runtime keys.
    pub fn begin_map(self) -> Result<MapDecoder<'r, R, O>> {
        let Shape::Map(value) = self.shape else {
            return Err(self.mismatch());
        };
        if self.tag != TagID::Compound {
            return Err(self.mismatch());
        }
        let depth = self.nested_depth()?;
        Ok(MapDecoder {
            reader: self.reader,
            value,
            keys: HashSet::new(),
            state: FieldState::AwaitingField,
            config: self.config,
            depth,
            marker: PhantomData,
        })
    }

    /// Starts decoding a `List` or compact array.
    ///
    /// For `List` the element tag is read from the stream; for compact arrays it
    /// is implied. Either way it must satisfy the declared element shape. The
    /// element count is read up front and available through [`ListDecoder::len`].
    pub fn begin_list(self) -> Result<ListDecoder<'r, R, O>> {
        let Shape::Sequence { element, .. } = self.shape else {
            return Err(self.mismatch());
        };
        let depth = self.nested_depth()?;
        let element_tag = match self.tag {
            TagID::List => read_tag(self.reader)?,
            tag => match tag.array_element() {
                Some(element_tag) => element_tag,
                None => return Err(self.mismatch()),
            },
        };
        let len = read_len::<O>(self.reader)?;
        if element_tag == TagID::End {
            if len > 0 {
                cold_path();
                return Err(Error::MalformedStream(Malformed::EndElementWithLength(len)));
            }
        } else {
            let element = element();
            if !element_tag.is_compatible(element.kind()) {
                cold_path();
                return Err(Error::ElementTypeMismatch {
                    element: element_tag,
                    expected: element.kind(),
                });
            }
        }
        Ok(ListDecoder {
            reader: self.reader,
            element_tag,
            len,
            index: 0,
            config: self.config,
            depth,
            marker: PhantomData,
        })
    }
}

#[derive(Clone, Copy)]
enum FieldState {
    AwaitingField,
    /// A name has been read; its value, of this tag, is next in the stream.
    Pending(TagID),
    Done,
}

fn decode_value<T: Decode, R: Read, O: ByteOrder>(
    reader: &mut R,
    tag: TagID,
    config: Config,
    depth: usize,
) -> Result<T> {
    let shape = T::shape();
    let kind = shape.kind();
    if !tag.is_compatible(kind) {
        cold_path();
        return Err(Error::TagShapeMismatch {
            tag,
            expected: kind,
        });
    }
    T::decode(Decoder::<R, O>::new(reader, tag, shape, config, depth))
}

fn misuse(what: &str) -> Error {
    cold_path();
    Error::custom(format!("compound decoder misuse: {what}"))
}

/// Decoder for the fields of one record compound.
///
/// Fields arrive in wire order and are matched to the record by name.
pub struct CompoundDecoder<'r, R: Read, O: ByteOrder> {
    reader: &'r mut R,
    fields: &'static [Field],
    seen: Vec<bool>,
    decoded: usize,
    state: FieldState,
    config: Config,
    depth: usize,
    marker: PhantomData<O>,
}

impl<R: Read, O: ByteOrder> CompoundDecoder<'_, R, O> {
    /// Advances to the next field and returns its index in the record.
    ///
    /// Returns `None` once every declared field has been read and the
    /// terminating `End` tag has been consumed.
    ///
    /// # Errors
    ///
    /// - [`Error::ArityMismatch`] if the compound ends early or has a surplus field
    /// - [`Error::UnknownField`] if a name is not declared by the record
    /// - [`Error::DuplicateField`] if a name appears twice
    pub fn next_field(&mut self) -> Result<Option<usize>> {
        match self.state {
            FieldState::AwaitingField => {}
            FieldState::Done => return Ok(None),
            FieldState::Pending(_) => return Err(misuse("next_field before read_value")),
        }
        let tag = read_tag(self.reader)?;
        let expected = self.fields.len();
        if self.decoded == expected {
            if tag != TagID::End {
                cold_path();
                return Err(Error::ArityMismatch {
                    expected,
                    found: expected + 1,
                });
            }
            self.state = FieldState::Done;
            return Ok(None);
        }
        if tag == TagID::End {
            cold_path();
            return Err(Error::ArityMismatch {
                expected,
                found: self.decoded,
            });
        }
        let name = read_string::<O>(self.reader, self.config.string_encoding)?;
        let Some(index) = self.fields.iter().position(|field| field.name == name) else {
            cold_path();
            return Err(Error::UnknownField(name));
        };
        if self.seen[index] {
            cold_path();
            return Err(Error::DuplicateField(name));
        }
        self.seen[index] = true;
        self.decoded += 1;
        self.state = FieldState::Pending(tag);
        Ok(Some(index))
    }

    /// Decodes the value of the field returned by the last [`next_field`](Self::next_field).
    pub fn read_value<T: Decode>(&mut self) -> Result<T> {
        let FieldState::Pending(tag) = self.state else {
            return Err(misuse("read_value without a pending field"));
        };
        self.state = FieldState::AwaitingField;
        decode_value::<T, R, O>(self.reader, tag, self.config, self.depth)
    }

    /// Consumes the terminating `End` of a compound whose fields have all been read.
    ///
    /// Does nothing if [`next_field`](Self::next_field) already returned `None`.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingField`] if a declared field has not been read
    /// - [`Error::ArityMismatch`] if the compound carries a surplus field
    pub fn end(mut self) -> Result<()> {
        match self.state {
            FieldState::Done => return Ok(()),
            FieldState::Pending(_) => return Err(misuse("end before read_value")),
            FieldState::AwaitingField => {}
        }
        if let Some(index) = self.seen.iter().position(|seen| !seen) {
            cold_path();
            return Err(Error::MissingField(self.fields[index].name));
        }
        self.next_field().map(|_| ())
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field_name(&self, index: usize) -> Option<&'static str> {
        self.fields.get(index).map(|field| field.name)
    }
}

/// Decoder for the entries of a string-keyed compound.
pub struct MapDecoder<'r, R: Read, O: ByteOrder> {
    reader: &'r mut R,
    value: ShapeFn,
    keys: HashSet<String>,
    state: FieldState,
    config: Config,
    depth: usize,
    marker: PhantomData<O>,
}

impl<R: Read, O: ByteOrder> MapDecoder<'_, R, O> {
    /// Reads the next entry name, or `None` at the terminating `End`.
    ///
    /// A name that repeats within the compound is [`Error::DuplicateField`].
    pub fn next_key(&mut self) -> Result<Option<String>> {
        match self.state {
            FieldState::AwaitingField => {}
            FieldState::Done => return Ok(None),
            FieldState::Pending(_) => return Err(misuse("next_key before read_value")),
        }
        let tag = read_tag(self.reader)?;
        if tag == TagID::End {
            self.state = FieldState::Done;
            return Ok(None);
        }
        let declared = (self.value)().kind();
        if !tag.is_compatible(declared) {
            cold_path();
            return Err(Error::TagShapeMismatch {
                tag,
                expected: declared,
            });
        }
        let name = read_string::<O>(self.reader, self.config.string_encoding)?;
        if !self.keys.insert(name.clone()) {
            cold_path();
            return Err(Error::DuplicateField(name));
        }
        self.state = FieldState::Pending(tag);
        Ok(Some(name))
    }

    pub fn read_value<T: Decode>(&mut self) -> Result<T> {
        let FieldState::Pending(tag) = self.state else {
            return Err(misuse("read_value without a pending key"));
        };
        self.state = FieldState::AwaitingField;
        decode_value::<T, R, O>(self.reader, tag, self.config, self.depth)
    }
}

/// Decoder for the elements of one `List` or compact array.
pub struct ListDecoder<'r, R: Read, O: ByteOrder> {
    reader: &'r mut R,
    element_tag: TagID,
    len: u32,
    index: u32,
    config: Config,
    depth: usize,
    marker: PhantomData<O>,
}

impl<R: Read, O: ByteOrder> ListDecoder<'_, R, O> {
    /// The exact number of elements, known before any element is read.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn remaining(&self) -> u32 {
        self.len - self.index
    }

    pub fn element_tag(&self) -> TagID {
        self.element_tag
    }

    /// Decodes the next element, or returns `None` after the last one.
    pub fn next_element<T: Decode>(&mut self) -> Result<Option<T>> {
        if self.index >= self.len {
            return Ok(None);
        }
        self.index += 1;
        let shape = T::shape();
        let kind = shape.kind();
        if !self.element_tag.is_compatible(kind) {
            cold_path();
            return Err(Error::ElementTypeMismatch {
                element: self.element_tag,
                expected: kind,
            });
        }
        T::decode(Decoder::<R, O>::new(
            &mut *self.reader,
            self.element_tag,
            shape,
            self.config,
            self.depth,
        ))
        .map(Some)
    }
}

fn root_admits(tag: TagID, kind: ShapeKind) -> bool {
    match tag {
        TagID::Compound => tag.is_compatible(kind),
        TagID::List => matches!(kind, ShapeKind::Sequence { .. }),
        _ => matches!(
            kind,
            ShapeKind::Sequence {
                form: SequenceForm::Auto,
                ..
            }
        ),
    }
}

/// Decode a complete document from a reader, returning the root name and the value.
///
/// A root compound carries a name; a root list or array does not, and the
/// returned name is empty. A root list or array is checked element-wise, so
/// an `IntArray` against a sequence of shorts fails with
/// [`Error::ElementTypeMismatch`].
pub fn from_reader_with<O: ByteOrder, T: Decode>(
    reader: &mut impl Read,
    config: &Config,
) -> Result<(String, T)> {
    decode_root::<O, T, _>(reader, config)
}

fn decode_root<O: ByteOrder, T: Decode, R: Read>(
    reader: &mut R,
    config: &Config,
) -> Result<(String, T)> {
    let tag = read_tag(reader)?;
    let name = match tag {
        TagID::Compound => read_string::<O>(reader, config.string_encoding)?,
        tag if tag.is_sequence() => String::new(),
        tag => {
            cold_path();
            return Err(Error::MalformedStream(Malformed::InvalidRoot(tag)));
        }
    };
    let shape = T::shape();
    let kind = shape.kind();
    if !root_admits(tag, kind) {
        cold_path();
        return Err(Error::TagShapeMismatch {
            tag,
            expected: kind,
        });
    }
    trace!(%tag, name = name.as_str(), "decoding root");
    let value = T::decode(Decoder::<R, O>::new(reader, tag, shape, *config, 0))?;
    Ok((name, value))
}

/// Decode a value from any `std::io::Read` implementation with the default [`Config`].
///
/// Bytes after the root value are left unread.
///
/// # Example
/// ```ignore
/// use std::fs::File;
/// let file = File::open("level.dat")?;
/// let level: Level = from_reader::<BigEndian, _>(file)?;
/// ```
pub fn from_reader<O: ByteOrder, T: Decode>(mut reader: impl Read) -> Result<T> {
    from_reader_with::<O, T>(&mut reader, &Config::default()).map(|(_, value)| value)
}

/// Convenience function for deserializing from a reader with big-endian byte order.
#[inline]
pub fn from_reader_be<T: Decode>(reader: impl Read) -> Result<T> {
    from_reader::<zerocopy::byteorder::BigEndian, T>(reader)
}

/// Convenience function for deserializing from a reader with little-endian byte order.
#[inline]
pub fn from_reader_le<T: Decode>(reader: impl Read) -> Result<T> {
    from_reader::<zerocopy::byteorder::LittleEndian, T>(reader)
}

/// Decode a document from a byte slice, returning the root name and the value.
///
/// # Errors
///
/// In addition to the decoding errors, fails with
/// [`Malformed::TrailingData`] if bytes remain after the root value.
pub fn from_slice_with<O: ByteOrder, T: Decode>(
    input: &[u8],
    config: &Config,
) -> Result<(String, T)> {
    let mut input = input;
    let decoded = from_reader_with::<O, T>(&mut input, config)?;
    if input.is_empty() {
        Ok(decoded)
    } else {
        cold_path();
        Err(Error::MalformedStream(Malformed::TrailingData(input.len())))
    }
}

/// Decode a value from a byte slice with the default [`Config`].
///
/// # Example
///
/// ```
/// use shaped_nbt::{BigEndian, from_slice};
///
/// let data = [0x0B, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x2A];
/// let ints: Vec<i32> = from_slice::<BigEndian, _>(&data).unwrap();
/// assert_eq!(ints, [42]);
/// ```
pub fn from_slice<O: ByteOrder, T: Decode>(input: &[u8]) -> Result<T> {
    from_slice_with::<O, T>(input, &Config::default()).map(|(_, value)| value)
}

/// Convenience function for deserializing with big-endian byte order.
#[inline]
pub fn from_slice_be<T: Decode>(input: &[u8]) -> Result<T> {
    from_slice::<zerocopy::byteorder::BigEndian, T>(input)
}

/// Convenience function for deserializing with little-endian byte order.
#[inline]
pub fn from_slice_le<T: Decode>(input: &[u8]) -> Result<T> {
    from_slice::<zerocopy::byteorder::LittleEndian, T>(input)
}
