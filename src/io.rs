//! Stream entry points with optional gzip.
//!
//! NBT files on disk are usually gzip-compressed; network payloads usually
//! are not. The `compressed` flag picks between the two without changing the
//! encoded document.

use std::io::{BufReader, BufWriter, Read, Write};

use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use tracing::instrument;

use crate::{ByteOrder, Config, Decode, Encode, Result, de::from_reader_with, ser::to_writer_with};

/// Encode `value` as a document with an empty root name into `sink`.
///
/// # Example
///
/// ```
/// use shaped_nbt::{BigEndian, decode_from, encode_to};
///
/// let mut file = Vec::new();
/// encode_to::<BigEndian, _, _>(&vec![1i64, 2, 3], &mut file, true).unwrap();
/// assert_eq!(&file[..2], &[0x1F, 0x8B]); // gzip magic
///
/// let longs: Vec<i64> = decode_from::<BigEndian, _, _>(file.as_slice(), true).unwrap();
/// assert_eq!(longs, [1, 2, 3]);
/// ```
pub fn encode_to<O: ByteOrder, T: ?Sized + Encode, W: Write>(
    value: &T,
    sink: W,
    compressed: bool,
) -> Result<()> {
    encode_to_with::<O, T, W>(value, sink, compressed, "", &Config::default())
}

/// Encode `value` into `sink` under the root name `name`.
#[instrument(skip_all, err, fields(compressed = compressed, name = name))]
pub fn encode_to_with<O: ByteOrder, T: ?Sized + Encode, W: Write>(
    value: &T,
    sink: W,
    compressed: bool,
    name: &str,
    config: &Config,
) -> Result<()> {
    let mut writer = BufWriter::new(sink);
    if compressed {
        let mut encoder = GzEncoder::new(&mut writer, Compression::default());
        to_writer_with::<O>(&mut encoder, name, value, config)?;
        encoder.finish()?;
    } else {
        to_writer_with::<O>(&mut writer, name, value, config)?;
    }
    writer.flush()?;
    Ok(())
}

/// Decode a document from `source`, discarding the root name.
pub fn decode_from<O: ByteOrder, T: Decode, R: Read>(source: R, compressed: bool) -> Result<T> {
    decode_from_with::<O, T, R>(source, compressed, &Config::default()).map(|(_, value)| value)
}

/// Decode a document from `source`, returning the root name alongside the value.
///
/// Reading stops after the root value; anything after it is left unread.
#[instrument(skip_all, err, fields(compressed = compressed))]
pub fn decode_from_with<O: ByteOrder, T: Decode, R: Read>(
    source: R,
    compressed: bool,
    config: &Config,
) -> Result<(String, T)> {
    let mut reader = BufReader::new(source);
    if compressed {
        let mut decoder = GzDecoder::new(reader);
        from_reader_with::<O, T>(&mut decoder, config)
    } else {
        from_reader_with::<O, T>(&mut reader, config)
    }
}
