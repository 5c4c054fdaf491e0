use std::{
    borrow::Cow,
    io::{Read, Write},
};

use zerocopy::byteorder;

use crate::{Error, Malformed, Result, StringEncoding, TagID};

#[inline(always)]
#[cold]
pub(crate) fn cold_path() {}

pub trait ByteOrder: zerocopy::ByteOrder + Send + Sync + 'static {}

impl<T: zerocopy::ByteOrder + Send + Sync + 'static> ByteOrder for T {}

/// Upper bound for capacity reserved from a length read off the wire.
pub(crate) const MAX_PREALLOC: usize = 4096;

pub(crate) fn write_tag(writer: &mut impl Write, tag: TagID) -> Result<()> {
    writer.write_all(&[tag as u8])?;
    Ok(())
}

pub(crate) fn read_tag(reader: &mut impl Read) -> Result<TagID> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    TagID::from_id(buf[0])
}

pub(crate) fn write_len<O: ByteOrder>(writer: &mut impl Write, len: usize) -> Result<()> {
    let len = i32::try_from(len).map_err(|_| Error::LengthOverflow(len))?;
    writer.write_all(&byteorder::I32::<O>::new(len).to_bytes())?;
    Ok(())
}

pub(crate) fn read_len<O: ByteOrder>(reader: &mut impl Read) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    let len = byteorder::I32::<O>::from_bytes(buf).get();
    if len < 0 {
        cold_path();
        return Err(Error::MalformedStream(Malformed::NegativeLength(len)));
    }
    Ok(len as u32)
}

pub(crate) fn write_string<O: ByteOrder>(
    writer: &mut impl Write,
    value: &str,
    encoding: StringEncoding,
) -> Result<()> {
    let encoded: Cow<'_, [u8]> = match encoding {
        StringEncoding::Utf8 => Cow::Borrowed(value.as_bytes()),
        StringEncoding::ModifiedUtf8 => simd_cesu8::mutf8::encode(value),
    };
    let len = u16::try_from(encoded.len()).map_err(|_| Error::LengthOverflow(encoded.len()))?;
    writer.write_all(&byteorder::U16::<O>::new(len).to_bytes())?;
    writer.write_all(&encoded)?;
    Ok(())
}

pub(crate) fn read_string<O: ByteOrder>(
    reader: &mut impl Read,
    encoding: StringEncoding,
) -> Result<String> {
    let mut len = [0u8; 2];
    reader.read_exact(&mut len)?;
    let len = byteorder::U16::<O>::from_bytes(len).get() as usize;
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    match encoding {
        StringEncoding::Utf8 => String::from_utf8(bytes).map_err(|_| {
            cold_path();
            Error::MalformedStream(Malformed::InvalidUtf8)
        }),
        StringEncoding::ModifiedUtf8 => match simd_cesu8::mutf8::decode(&bytes) {
            Ok(decoded) => Ok(decoded.into_owned()),
            Err(_) => {
                cold_path();
                Err(Error::MalformedStream(Malformed::InvalidUtf8))
            }
        },
    }
}

/// Reads exactly `len` bytes without trusting `len` for the allocation size.
pub(crate) fn read_block(reader: &mut impl Read, len: usize) -> Result<Vec<u8>> {
    let mut block = Vec::with_capacity(len.min(MAX_PREALLOC));
    reader.take(len as u64).read_to_end(&mut block)?;
    if block.len() != len {
        cold_path();
        return Err(Error::MalformedStream(Malformed::UnexpectedEof));
    }
    Ok(block)
}
