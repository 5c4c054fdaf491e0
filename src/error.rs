//! Error types for NBT encoding and decoding.
//!
//! Every failure aborts the whole encode or decode call. There is no
//! best-effort mode: a stream that produced an error must not be reused.
//!
//! # Example
//!
//! ```
//! use shaped_nbt::{Error, Malformed, from_slice_be};
//!
//! // A root `Int` is not a valid document.
//! let data = [0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05];
//! match from_slice_be::<Vec<i32>>(&data) {
//!     Err(Error::MalformedStream(Malformed::InvalidRoot(tag))) => {
//!         println!("bad root tag: {tag}");
//!     }
//!     other => panic!("unexpected result: {other:?}"),
//! }
//! ```

use std::fmt::Display;

use thiserror::Error;

use crate::{ShapeKind, TagID};

/// Alias for a `Result` with the error type [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// All errors that can occur when encoding or decoding NBT data.
#[derive(Error, Debug)]
pub enum Error {
    /// A byte outside the closed tag set `0..=12` was read where a tag was expected.
    #[error("unknown NBT tag id: {0:#04x}")]
    UnknownTag(u8),

    /// The bytes are structurally invalid.
    #[error("malformed stream: {0}")]
    MalformedStream(#[from] Malformed),

    /// A tag is incompatible with the shape expected at that position.
    #[error("tag {tag} cannot satisfy a {expected} shape")]
    TagShapeMismatch { tag: TagID, expected: ShapeKind },

    /// A compound field name has no counterpart in the expected record.
    #[error("unknown field `{0}`")]
    UnknownField(String),

    /// A compound carries the same field name twice.
    #[error("duplicate field `{0}`")]
    DuplicateField(String),

    /// A record walker finished without receiving a declared field.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// The number of fields on the wire (or written) differs from the record's.
    ///
    /// When a compound has too many fields, `found` is `expected + 1`: decoding
    /// stops at the first surplus field.
    #[error("record declares {expected} fields, found {found}")]
    ArityMismatch { expected: usize, found: usize },

    /// A list or array element tag disagrees with the declared element shape.
    #[error("element tag {element} cannot satisfy a {expected} element shape")]
    ElementTypeMismatch { element: TagID, expected: ShapeKind },

    /// Nesting went deeper than [`Config::max_depth`](crate::Config::max_depth).
    #[error("nesting depth exceeds the limit of {0}")]
    DepthExceeded(usize),

    /// A known-size list received a different number of elements than announced.
    #[error("list declared {declared} elements but {written} were written")]
    LengthMismatch { declared: usize, written: usize },

    /// A length does not fit its wire prefix (`u16` for strings, `i32` for lists).
    #[error("length {0} does not fit its wire prefix")]
    LengthOverflow(usize),

    /// An I/O error from the underlying reader or writer.
    #[error(transparent)]
    Io(std::io::Error),

    /// A custom error raised by a schema walker.
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates an [`Error::Message`] from anything displayable.
    pub fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::MalformedStream(Malformed::UnexpectedEof)
        } else {
            Error::Io(error)
        }
    }
}

/// The ways a byte stream can be structurally invalid.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    /// The input ended in the middle of a value.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A list or array announced a negative element count.
    #[error("negative length {0}")]
    NegativeLength(i32),

    /// The document does not start with a compound, list or array tag.
    #[error("tag {0} cannot start a document")]
    InvalidRoot(TagID),

    /// A string is not valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    /// A list declares `End` elements but a non-zero length.
    #[error("list of End tags with length {0}")]
    EndElementWithLength(u32),

    /// Bytes remain after the root value.
    #[error("{0} trailing bytes after the root value")]
    TrailingData(usize),
}
