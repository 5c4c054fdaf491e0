//! Encoding engine.
//!
//! A value is encoded by its [`Encode`] impl pushing data into an [`Encoder`].
//! The encoder for a position has already committed to a wire tag (derived
//! from the value's [`Shape`]) and only accepts the payload matching it.
//!
//! # Quick Start
//!
//! ```
//! use shaped_nbt::{nbt_record, to_vec_be};
//!
//! nbt_record! {
//!     struct Spawn {
//!         a: i32,
//!         b: Vec<i32>,
//!     }
//! }
//!
//! let bytes = to_vec_be(&Spawn { a: 5, b: vec![1, 2, 3] }).unwrap();
//! assert_eq!(&bytes[..3], &[0x0A, 0x00, 0x00]);
//! ```
//!
//! # Lists of unknown length
//!
//! The wire format needs the element count before the elements. When a
//! walker cannot tell the count up front it calls
//! [`Encoder::begin_list`] with `None`: elements are encoded into a scratch
//! buffer owned by the [`ListEncoder`] and written out, count first, by
//! [`ListEncoder::end`]. The bytes are identical to the known-length path.

use std::{io::Write, marker::PhantomData};

use tracing::{debug, trace};
use zerocopy::{IntoBytes, byteorder};

use crate::{
    ByteOrder, Config, Error, Field, Malformed, Result, Schema, Shape, ShapeFn, TagID, cold_path,
    util::{write_len, write_string, write_tag},
};

/// Value production capability: how a type pushes itself into an [`Encoder`].
pub trait Encode: Schema {
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()>;

    /// Encodes a slice of values as one sequence.
    ///
    /// The default goes element by element through [`Encoder::begin_list`].
    /// Byte, int and long scalars override it with the compact array fast path.
    fn encode_slice<W: Write, O: ByteOrder>(
        items: &[Self],
        encoder: Encoder<'_, W, O>,
    ) -> Result<()>
    where
        Self: Sized,
    {
        let mut list = encoder.begin_list(Some(items.len()))?;
        for item in items {
            list.write_element(item)?;
        }
        list.end()
    }
}

/// Encoder for one value whose tag has already been chosen.
pub struct Encoder<'w, W: Write, O: ByteOrder> {
    writer: &'w mut W,
    tag: TagID,
    shape: Shape,
    config: Config,
    depth: usize,
    marker: PhantomData<O>,
}

macro_rules! write_number {
    ($name:ident, $ty:ty, $wire:ident, $tag:ident) => {
        #[inline]
        pub fn $name(self, value: $ty) -> Result<()> {
            self.expect(TagID::$tag)?;
            self.writer
                .write_all(&byteorder::$wire::<O>::new(value).to_bytes())?;
            Ok(())
        }
    };
}

impl<'w, W: Write, O: ByteOrder> Encoder<'w, W, O> {
    pub(crate) fn new(
        writer: &'w mut W,
        tag: TagID,
        shape: Shape,
        config: Config,
        depth: usize,
    ) -> Self {
        Self {
            writer,
            tag,
            shape,
            config,
            depth,
            marker: PhantomData,
        }
    }

    /// The wire tag this value is written under.
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
    fn expect(&self, tag: TagID) -> Result<()> {
        if self.tag == tag {
            Ok(())
        } else {
            cold_path();
            Err(Error::TagShapeMismatch {
                tag,
                expected: self.shape.kind(),
            })
        }
    }

    fn nested_depth(&self) -> Result<usize> {
        let depth = self.depth + 1;
        if depth > self.config.max_depth {
            cold_path();
            debug!(limit = self.config.max_depth, "encode depth limit reached");
            return Err(Error::DepthExceeded(self.config.max_depth));
        }
        Ok(depth)
    }

    #[inline]
    pub fn write_i8(self, value: i8) -> Result<()> {
        self.expect(TagID::Byte)?;
        self.writer.write_all(&[value as u8])?;
        Ok(())
    }

    #[inline]
    pub fn write_bool(self, value: bool) -> Result<()> {
        self.write_i8(value as i8)
    }

    write_number!(write_i16, i16, I16, Short);
    write_number!(write_i32, i32, I32, Int);
    write_number!(write_i64, i64, I64, Long);
    write_number!(write_f32, f32, F32, Float);
    write_number!(write_f64, f64, F64, Double);

    pub fn write_str(self, value: &str) -> Result<()> {
        self.expect(TagID::String)?;
        write_string::<O>(self.writer, value, self.config.string_encoding)
    }

    /// Writes a `ByteArray` block in one go.
    ///
    /// If this position was opened as a generic `List` (see
    /// [`ListOf`](crate::ListOf)), the values are written as `Byte` elements instead.
    pub fn write_byte_array(self, values: &[i8]) -> Result<()> {
        match self.tag {
            TagID::ByteArray => self.write_bytes(values.as_bytes()),
            _ => self.write_elements(values),
        }
    }

    /// Unsigned counterpart of [`write_byte_array`](Self::write_byte_array).
    pub fn write_bytes(self, values: &[u8]) -> Result<()> {
        match self.tag {
            TagID::ByteArray => {
                write_len::<O>(self.writer, values.len())?;
                self.writer.write_all(values)?;
                Ok(())
            }
            _ => self.write_elements(values),
        }
    }

    /// Writes an `IntArray` block in one go, falling back to `List` like
    /// [`write_byte_array`](Self::write_byte_array).
    pub fn write_int_array(self, values: &[i32]) -> Result<()> {
        match self.tag {
            TagID::IntArray => {
                write_len::<O>(self.writer, values.len())?;
                let block: Vec<byteorder::I32<O>> =
                    values.iter().copied().map(byteorder::I32::new).collect();
                self.writer.write_all(block.as_bytes())?;
                Ok(())
            }
            _ => self.write_elements(values),
        }
    }

    /// Writes a `LongArray` block in one go, falling back to `List` like
    /// [`write_byte_array`](Self::write_byte_array).
    pub fn write_long_array(self, values: &[i64]) -> Result<()> {
        match self.tag {
            TagID::LongArray => {
                write_len::<O>(self.writer, values.len())?;
                let block: Vec<byteorder::I64<O>> =
                    values.iter().copied().map(byteorder::I64::new).collect();
                self.writer.write_all(block.as_bytes())?;
                Ok(())
            }
            _ => self.write_elements(values),
        }
    }

    fn write_elements<T: Encode>(self, values: &[T]) -> Result<()> {
        let mut list = self.begin_list(Some(values.len()))?;
        for value in values {
            list.write_element(value)?;
        }
        list.end()
    }

    /// Starts a record. Fields are written by index into the record's declared
    /// field table.
    pub fn begin_compound(self) -> Result<CompoundEncoder<'w, W, O>> {
        let Shape::Record(fields) = self.shape else {
            cold_path();
            return Err(Error::TagShapeMismatch {
                tag: TagID::Compound,
                expected: self.shape.kind(),
            });
        };
        let depth = self.nested_depth()?;
        Ok(CompoundEncoder {
            writer: self.writer,
            fields,
            seen: vec![false; fields.len()],
            written: 0,
            config: self.config,
            depth,
            marker: PhantomData,
        })
    }

    /// Starts a compound with runtime keys.
    pub fn begin_map(self) -> Result<MapEncoder<'w, W, O>> {
        let Shape::Map(value) = self.shape else {
            cold_path();
            return Err(Error::TagShapeMismatch {
                tag: TagID::Compound,
                expected: self.shape.kind(),
            });
        };
        let depth = self.nested_depth()?;
        Ok(MapEncoder {
            writer: self.writer,
            value,
            config: self.config,
            depth,
            marker: PhantomData,
        })
    }

    /// Starts a sequence.
    ///
    /// With `Some(len)` the header and count are written immediately and every
    /// element streams straight to the writer. With `None` the count is
    /// deferred and elements are buffered until [`ListEncoder::end`].
    pub fn begin_list(self, len: Option<usize>) -> Result<ListEncoder<'w, W, O>> {
        let Shape::Sequence { element, .. } = self.shape else {
            cold_path();
            return Err(Error::TagShapeMismatch {
                tag: TagID::List,
                expected: self.shape.kind(),
            });
        };
        let depth = self.nested_depth()?;
        let element = element();
        let element_tag = TagID::for_shape(&element);
        if !self.tag.is_array() {
            write_tag(self.writer, element_tag)?;
        }
        let pending = match len {
            Some(declared) => {
                write_len::<O>(self.writer, declared)?;
                Pending::Streaming { declared }
            }
            None => Pending::Buffered(Vec::new()),
        };
        Ok(ListEncoder {
            writer: self.writer,
            element,
            element_tag,
            written: 0,
            pending,
            config: self.config,
            depth,
            marker: PhantomData,
        })
    }
}

/// Encoder for the fields of one record.
///
/// [`end`](Self::end) must be called to terminate the compound.
pub struct CompoundEncoder<'w, W: Write, O: ByteOrder> {
    writer: &'w mut W,
    fields: &'static [Field],
    seen: Vec<bool>,
    written: usize,
    config: Config,
    depth: usize,
    marker: PhantomData<O>,
}

impl<W: Write, O: ByteOrder> CompoundEncoder<'_, W, O> {
    /// Writes the field at `index` of the declared field table: tag, name, payload.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownField`] if `index` is outside the field table
    /// - [`Error::DuplicateField`] if the field was already written
    /// - [`Error::TagShapeMismatch`] if `T` does not conform to the field's shape
    pub fn write_field<T: Encode + ?Sized>(&mut self, index: usize, value: &T) -> Result<()> {
        let Some(field) = self.fields.get(index) else {
            cold_path();
            return Err(Error::UnknownField(format!("#{index}")));
        };
        if self.seen[index] {
            cold_path();
            return Err(Error::DuplicateField(field.name.to_string()));
        }
        let shape = T::shape();
        let tag = TagID::for_shape(&shape);
        let declared = field.shape();
        if !shape.conforms_to(&declared) {
            cold_path();
            return Err(Error::TagShapeMismatch {
                tag,
                expected: declared.kind(),
            });
        }
        self.seen[index] = true;
        write_tag(self.writer, tag)?;
        write_string::<O>(self.writer, field.name, self.config.string_encoding)?;
        value.encode(Encoder::<W, O>::new(
            &mut *self.writer,
            tag,
            shape,
            self.config,
            self.depth,
        ))?;
        self.written += 1;
        Ok(())
    }

    /// Terminates the compound with `End`.
    ///
    /// Each declared field is written at most once, so a full count means
    /// every field is present.
    pub fn end(self) -> Result<()> {
        if self.written != self.fields.len() {
            cold_path();
            return Err(Error::ArityMismatch {
                expected: self.fields.len(),
                found: self.written,
            });
        }
        write_tag(self.writer, TagID::End)
    }
}

/// Encoder for the entries of a string-keyed compound.
pub struct MapEncoder<'w, W: Write, O: ByteOrder> {
    writer: &'w mut W,
    value: ShapeFn,
    config: Config,
    depth: usize,
    marker: PhantomData<O>,
}

impl<W: Write, O: ByteOrder> MapEncoder<'_, W, O> {
    pub fn write_entry<T: Encode + ?Sized>(&mut self, name: &str, value: &T) -> Result<()> {
        let shape = T::shape();
        let tag = TagID::for_shape(&shape);
        let declared = (self.value)();
        if !shape.conforms_to(&declared) {
            cold_path();
            return Err(Error::TagShapeMismatch {
                tag,
                expected: declared.kind(),
            });
        }
        write_tag(self.writer, tag)?;
        write_string::<O>(self.writer, name, self.config.string_encoding)?;
        value.encode(Encoder::<W, O>::new(
            &mut *self.writer,
            tag,
            shape,
            self.config,
            self.depth,
        ))
    }

    pub fn end(self) -> Result<()> {
        write_tag(self.writer, TagID::End)
    }
}

enum Pending {
    Streaming { declared: usize },
    /// Element payloads held back until the count is known.
    Buffered(Vec<u8>),
}

/// Encoder for the elements of one sequence.
///
/// [`end`](Self::end) must be called; for an unknown-length list nothing but
/// the element tag reaches the writer before it.
pub struct ListEncoder<'w, W: Write, O: ByteOrder> {
    writer: &'w mut W,
    element: Shape,
    element_tag: TagID,
    written: usize,
    pending: Pending,
    config: Config,
    depth: usize,
    marker: PhantomData<O>,
}

impl<W: Write, O: ByteOrder> ListEncoder<'_, W, O> {
    pub fn element_tag(&self) -> TagID {
        self.element_tag
    }

    /// Number of elements written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn write_element<T: Encode + ?Sized>(&mut self, value: &T) -> Result<()> {
        let shape = T::shape();
        let tag = TagID::for_shape(&shape);
        if !shape.conforms_to(&self.element) {
            cold_path();
            return Err(Error::ElementTypeMismatch {
                element: tag,
                expected: self.element.kind(),
            });
        }
        match &mut self.pending {
            Pending::Streaming { declared } => {
                if self.written >= *declared {
                    cold_path();
                    return Err(Error::LengthMismatch {
                        declared: *declared,
                        written: self.written + 1,
                    });
                }
                value.encode(Encoder::<W, O>::new(
                    &mut *self.writer,
                    tag,
                    shape,
                    self.config,
                    self.depth,
                ))?;
            }
            Pending::Buffered(buffer) => {
                value.encode(Encoder::<Vec<u8>, O>::new(
                    buffer,
                    tag,
                    shape,
                    self.config,
                    self.depth,
                ))?;
            }
        }
        self.written += 1;
        Ok(())
    }

    /// Closes the sequence, flushing the buffered elements of an
    /// unknown-length list behind their count.
    pub fn end(self) -> Result<()> {
        match self.pending {
            Pending::Streaming { declared } => {
                if self.written != declared {
                    cold_path();
                    return Err(Error::LengthMismatch {
                        declared,
                        written: self.written,
                    });
                }
            }
            Pending::Buffered(buffer) => {
                trace!(
                    count = self.written,
                    bytes = buffer.len(),
                    "flushing buffered list"
                );
                write_len::<O>(self.writer, self.written)?;
                self.writer.write_all(&buffer)?;
            }
        }
        Ok(())
    }
}

/// Encode a value as a complete document with the given root name.
///
/// Records and maps are written as a named root compound. Sequences are
/// written as their tag followed by the payload, without a name. Scalars
/// cannot be a document root.
///
/// # Errors
///
/// Returns an error if:
/// - The root is a scalar ([`Malformed::InvalidRoot`])
/// - A record writes a different number of fields than it declares ([`Error::ArityMismatch`])
/// - A list or string is too long for its length prefix ([`Error::LengthOverflow`])
/// - Nesting exceeds [`Config::max_depth`] ([`Error::DepthExceeded`])
pub fn to_writer_with<O: ByteOrder>(
    writer: &mut impl Write,
    name: &str,
    value: &(impl ?Sized + Encode),
    config: &Config,
) -> Result<()> {
    encode_root::<O, _, _>(writer, name, value, config)
}

fn encode_root<O: ByteOrder, W: Write, T: ?Sized + Encode>(
    writer: &mut W,
    name: &str,
    value: &T,
    config: &Config,
) -> Result<()> {
    let shape = T::shape();
    let tag = TagID::for_shape(&shape);
    trace!(%tag, name, "encoding root");
    match tag {
        TagID::Compound => {
            write_tag(writer, tag)?;
            write_string::<O>(writer, name, config.string_encoding)?;
        }
        tag if tag.is_sequence() => write_tag(writer, tag)?,
        tag => {
            cold_path();
            return Err(Error::MalformedStream(Malformed::InvalidRoot(tag)));
        }
    }
    value.encode(Encoder::<W, O>::new(writer, tag, shape, *config, 0))
}

/// Encode a value under an empty root name with the default [`Config`].
#[inline]
pub fn to_writer<O: ByteOrder>(
    writer: &mut impl Write,
    value: &(impl ?Sized + Encode),
) -> Result<()> {
    to_writer_with::<O>(writer, "", value, &Config::default())
}

/// Convenience function for writing with big-endian byte order.
#[inline]
pub fn to_writer_be(writer: &mut impl Write, value: &(impl ?Sized + Encode)) -> Result<()> {
    to_writer::<zerocopy::byteorder::BigEndian>(writer, value)
}

/// Convenience function for writing with little-endian byte order.
#[inline]
pub fn to_writer_le(writer: &mut impl Write, value: &(impl ?Sized + Encode)) -> Result<()> {
    to_writer::<zerocopy::byteorder::LittleEndian>(writer, value)
}

/// Encode a value into a new byte vector.
///
/// # Example
///
/// ```
/// use shaped_nbt::{BigEndian, to_vec};
///
/// let bytes = to_vec::<BigEndian>(&vec![7i64]).unwrap();
/// assert_eq!(bytes[0], 12); // LongArray root
/// ```
#[inline]
pub fn to_vec<O: ByteOrder>(value: &(impl ?Sized + Encode)) -> Result<Vec<u8>> {
    let mut vec = Vec::new();
    to_writer::<O>(&mut vec, value)?;
    Ok(vec)
}

/// Convenience function for serializing with big-endian byte order.
#[inline]
pub fn to_vec_be(value: &(impl ?Sized + Encode)) -> Result<Vec<u8>> {
    to_vec::<zerocopy::byteorder::BigEndian>(value)
}

/// Convenience function for serializing with little-endian byte order.
#[inline]
pub fn to_vec_le(value: &(impl ?Sized + Encode)) -> Result<Vec<u8>> {
    to_vec::<zerocopy::byteorder::LittleEndian>(value)
}
