use std::fmt;
use std::io::Read;

use super::format::ConfigFormat;

/// Arguments accepted by [`Registry::read_config`](crate::Registry::read_config).
///
/// The local registry expects a readable stream first, optionally followed by a
/// format override. The remote registry fetches its own bytes and ignores them.
pub enum ReadOption<'a> {
    /// Any readable stream: a file, a cursor, a socket.
    Stream(Box<dyn Read + 'a>),
    /// Bytes already held in memory.
    Bytes(Vec<u8>),
    /// Overrides the format declared with `set_config_type`.
    Format(ConfigFormat),
}

impl<'a> ReadOption<'a> {
    /// Wraps a reader into a stream option.
    pub fn stream(reader: impl Read + 'a) -> Self {
        Self::Stream(Box::new(reader))
    }

    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::Stream(_) => "stream",
            Self::Bytes(_) => "bytes",
            Self::Format(_) => "format",
        }
    }
}

impl fmt::Debug for ReadOption<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Self::Format(format) => f.debug_tuple("Format").field(format).finish(),
        }
    }
}

impl From<Vec<u8>> for ReadOption<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<ConfigFormat> for ReadOption<'_> {
    fn from(format: ConfigFormat) -> Self {
        Self::Format(format)
    }
}
