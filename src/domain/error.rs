use thiserror::Error;

use crate::infrastructure::decode::DecodeError;

use super::models::ConfigFormat;

/// Result alias used throughout the registry API.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors surfaced by registry operations
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("parameter with a readable stream required")]
    MissingStream,

    #[error("type of given parameter is not a readable stream: got {0}")]
    NotAStream(&'static str),

    #[error("unsupported config type \"{0}\"")]
    UnsupportedFormat(String),

    #[error("failed to read config source: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {format} config: {source}")]
    Parse {
        format: ConfigFormat,
        #[source]
        source: Box<figment::Error>,
    },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("config server returned non 200 status. err: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("config with key {0} not found")]
    KeyNotFound(String),

    #[error("failed to read config tree: {0}")]
    Tree(#[source] Box<figment::Error>),

    #[error("failed to decode config: {0}")]
    Decode(#[from] DecodeError),
}

impl RegistryError {
    /// Returns true for errors raised before any source was touched
    pub const fn is_argument_error(&self) -> bool {
        matches!(self, Self::MissingStream | Self::NotAStream(_))
    }
}

impl From<figment::Error> for RegistryError {
    fn from(err: figment::Error) -> Self {
        Self::Tree(Box::new(err))
    }
}
