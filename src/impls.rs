//! [`Schema`], [`Encode`] and [`Decode`] for std types.

use std::{
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
    io::{Read, Write},
    ops::{Deref, DerefMut},
};

use crate::{
    ByteOrder, Decode, Decoder, Encode, Encoder, Result, ScalarKind, Schema, SequenceForm, Shape,
};

macro_rules! scalar_schema {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Schema for $ty {
                #[inline]
                fn shape() -> Shape {
                    Shape::Scalar(ScalarKind::$kind)
                }
            }
        )*
    };
}

scalar_schema! {
    bool => Byte,
    i8 => Byte,
    u8 => Byte,
    i16 => Short,
    u16 => Short,
    i32 => Int,
    u32 => Int,
    i64 => Long,
    u64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    str => String,
}

/// Scalars whose values map one to one onto a wire representation.
macro_rules! scalar_codec {
    ($($ty:ty: $write:ident, $read:ident);* $(;)?) => {
        $(
            impl Encode for $ty {
                #[inline]
                fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
                    encoder.$write(*self)
                }
            }

            impl Decode for $ty {
                #[inline]
                fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
                    decoder.$read()
                }
            }
        )*
    };
}

scalar_codec! {
    bool: write_bool, read_bool;
    i16: write_i16, read_i16;
    f32: write_f32, read_f32;
    f64: write_f64, read_f64;
}

/// Unsigned integers are stored bit for bit in their signed counterpart.
macro_rules! unsigned_codec {
    ($($ty:ty as $signed:ty: $write:ident, $read:ident);* $(;)?) => {
        $(
            impl Encode for $ty {
                #[inline]
                fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
                    encoder.$write(*self as $signed)
                }
            }

            impl Decode for $ty {
                #[inline]
                fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
                    Ok(decoder.$read()? as $ty)
                }
            }
        )*
    };
}

unsigned_codec! {
    u16 as i16: write_i16, read_i16;
}

impl Encode for i8 {
    #[inline]
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        encoder.write_i8(*self)
    }

    fn encode_slice<W: Write, O: ByteOrder>(items: &[Self], encoder: Encoder<'_, W, O>) -> Result<()> {
        encoder.write_byte_array(items)
    }
}

impl Decode for i8 {
    #[inline]
    fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
        decoder.read_i8()
    }

    fn decode_vec<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Vec<Self>> {
        decoder.read_byte_array()
    }
}

impl Encode for u8 {
    #[inline]
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        encoder.write_i8(*self as i8)
    }

    fn encode_slice<W: Write, O: ByteOrder>(items: &[Self], encoder: Encoder<'_, W, O>) -> Result<()> {
        encoder.write_bytes(items)
    }
}

impl Decode for u8 {
    #[inline]
    fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
        Ok(decoder.read_i8()? as u8)
    }

    fn decode_vec<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Vec<Self>> {
        decoder.read_bytes()
    }
}

/// Int and long scalars, with the compact array fast path for slices.
macro_rules! array_codec {
    ($($ty:ty as $signed:ty: $write:ident, $read:ident, $write_array:ident, $read_array:ident);* $(;)?) => {
        $(
            impl Encode for $ty {
                #[inline]
                fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
                    encoder.$write(*self as $signed)
                }

                fn encode_slice<W: Write, O: ByteOrder>(
                    items: &[Self],
                    encoder: Encoder<'_, W, O>,
                ) -> Result<()> {
                    let values: Vec<$signed> = items.iter().map(|&item| item as $signed).collect();
                    encoder.$write_array(&values)
                }
            }

            impl Decode for $ty {
                #[inline]
                fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
                    Ok(decoder.$read()? as $ty)
                }

                fn decode_vec<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Vec<Self>> {
                    Ok(decoder
                        .$read_array()?
                        .into_iter()
                        .map(|value| value as $ty)
                        .collect())
                }
            }
        )*
    };
}

array_codec! {
    u32 as i32: write_i32, read_i32, write_int_array, read_int_array;
    u64 as i64: write_i64, read_i64, write_long_array, read_long_array;
}

impl Encode for i32 {
    #[inline]
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        encoder.write_i32(*self)
    }

    fn encode_slice<W: Write, O: ByteOrder>(items: &[Self], encoder: Encoder<'_, W, O>) -> Result<()> {
        encoder.write_int_array(items)
    }
}

impl Decode for i32 {
    #[inline]
    fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
        decoder.read_i32()
    }

    fn decode_vec<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Vec<Self>> {
        decoder.read_int_array()
    }
}

impl Encode for i64 {
    #[inline]
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        encoder.write_i64(*self)
    }

    fn encode_slice<W: Write, O: ByteOrder>(items: &[Self], encoder: Encoder<'_, W, O>) -> Result<()> {
        encoder.write_long_array(items)
    }
}

impl Decode for i64 {
    #[inline]
    fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
        decoder.read_i64()
    }

    fn decode_vec<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Vec<Self>> {
        decoder.read_long_array()
    }
}

impl Encode for str {
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        encoder.write_str(self)
    }
}

impl Encode for String {
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        encoder.write_str(self)
    }
}

impl Decode for String {
    fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
        decoder.read_string()
    }
}

impl<T: Schema + ?Sized> Schema for &T {
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        (**self).encode(encoder)
    }
}

impl<T: Schema + ?Sized> Schema for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        (**self).encode(encoder)
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
        T::decode(decoder).map(Box::new)
    }
}

impl<T: Schema> Schema for [T] {
    fn shape() -> Shape {
        Shape::list_of(T::shape)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        T::encode_slice(self, encoder)
    }
}

impl<T: Schema, const N: usize> Schema for [T; N] {
    fn shape() -> Shape {
        Shape::list_of(T::shape)
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        T::encode_slice(self, encoder)
    }
}

impl<T: Schema> Schema for Vec<T> {
    fn shape() -> Shape {
        Shape::list_of(T::shape)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        T::encode_slice(self, encoder)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
        T::decode_vec(decoder)
    }
}

/// A sequence that is always written as a generic `List`.
///
/// `Vec<i32>` becomes an `IntArray`; `ListOf<i32>` becomes a `List` of `Int`.
/// Decoding a `ListOf` rejects the compact array tags.
///
/// ```
/// use shaped_nbt::{ListOf, TagID, to_vec_be};
///
/// let bytes = to_vec_be(&ListOf(vec![1i32, 2])).unwrap();
/// assert_eq!(bytes[0], TagID::List as u8);
/// assert_eq!(bytes[1], TagID::Int as u8);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct ListOf<T>(pub Vec<T>);

impl<T> From<Vec<T>> for ListOf<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T> Deref for ListOf<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for ListOf<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: Schema> Schema for ListOf<T> {
    fn shape() -> Shape {
        Shape::Sequence {
            element: T::shape,
            form: SequenceForm::List,
        }
    }
}

impl<T: Encode> Encode for ListOf<T> {
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        let mut list = encoder.begin_list(Some(self.0.len()))?;
        for item in &self.0 {
            list.write_element(item)?;
        }
        list.end()
    }
}

impl<T: Decode> Decode for ListOf<T> {
    fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
        decoder.read_list().map(Self)
    }
}

/// A sequence produced lazily by an iterator whose length is not known up front.
///
/// Encoding takes the unknown-length path of [`Encoder::begin_list`]: elements
/// are buffered and the count is written once the iterator is exhausted. The
/// closure is called once per encode.
///
/// ```
/// use shaped_nbt::{Streamed, to_vec_be};
///
/// let evens = Streamed(|| (0..10i16).filter(|n| n % 2 == 0));
/// let bytes = to_vec_be(&evens).unwrap();
/// assert_eq!(&bytes[..6], &[0x09, 0x02, 0x00, 0x00, 0x00, 0x05]);
/// ```
#[derive(Clone, Copy)]
pub struct Streamed<F>(pub F);

impl<F, I> Schema for Streamed<F>
where
    F: Fn() -> I,
    I: IntoIterator,
    I::Item: Schema,
{
    fn shape() -> Shape {
        Shape::list_of(<I::Item as Schema>::shape)
    }
}

impl<F, I> Encode for Streamed<F>
where
    F: Fn() -> I,
    I: IntoIterator,
    I::Item: Encode,
{
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        let mut list = encoder.begin_list(None)?;
        for item in (self.0)() {
            list.write_element(&item)?;
        }
        list.end()
    }
}

impl<V: Schema, S> Schema for HashMap<String, V, S> {
    fn shape() -> Shape {
        Shape::Map(V::shape)
    }
}

impl<V: Encode, S> Encode for HashMap<String, V, S> {
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        let mut map = encoder.begin_map()?;
        for (name, value) in self {
            map.write_entry(name, value)?;
        }
        map.end()
    }
}

impl<V: Decode, S: BuildHasher + Default> Decode for HashMap<String, V, S> {
    fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
        let mut map = decoder.begin_map()?;
        let mut entries = HashMap::with_hasher(S::default());
        while let Some(name) = map.next_key()? {
            let value = map.read_value()?;
            entries.insert(name, value);
        }
        Ok(entries)
    }
}

impl<V: Schema> Schema for BTreeMap<String, V> {
    fn shape() -> Shape {
        Shape::Map(V::shape)
    }
}

impl<V: Encode> Encode for BTreeMap<String, V> {
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        let mut map = encoder.begin_map()?;
        for (name, value) in self {
            map.write_entry(name, value)?;
        }
        map.end()
    }
}

impl<V: Decode> Decode for BTreeMap<String, V> {
    fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
        let mut map = decoder.begin_map()?;
        let mut entries = BTreeMap::new();
        while let Some(name) = map.next_key()? {
            let value = map.read_value()?;
            entries.insert(name, value);
        }
        Ok(entries)
    }
}
