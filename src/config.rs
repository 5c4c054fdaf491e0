/// Text encoding used for string payloads and names.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum StringEncoding {
    /// Strict UTF-8. Invalid bytes fail decoding with
    /// [`Malformed::InvalidUtf8`](crate::Malformed::InvalidUtf8).
    #[default]
    Utf8,
    /// Java's modified UTF-8, as written by the JVM's `DataOutput::writeUTF`:
    /// NUL is two bytes and supplementary characters are surrogate pairs.
    /// Decoding is lossy.
    ModifiedUtf8,
}

/// Settings shared by one encode or decode call.
///
/// # Example
///
/// ```
/// use shaped_nbt::{Config, StringEncoding};
///
/// let config = Config::new()
///     .with_string_encoding(StringEncoding::ModifiedUtf8)
///     .with_max_depth(64);
/// assert_eq!(config.max_depth, 64);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Config {
    pub string_encoding: StringEncoding,
    /// Deepest compound/list nesting accepted before failing with
    /// [`Error::DepthExceeded`](crate::Error::DepthExceeded).
    pub max_depth: usize,
}

impl Config {
    pub const DEFAULT_MAX_DEPTH: usize = 512;

    pub const fn new() -> Self {
        Self {
            string_encoding: StringEncoding::Utf8,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    pub const fn with_string_encoding(mut self, string_encoding: StringEncoding) -> Self {
        self.string_encoding = string_encoding;
        self
    }

    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
