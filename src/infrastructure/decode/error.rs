use std::fmt::Display;

use thiserror::Error;

/// Errors raised while decoding a config value into a typed structure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("'{path}' expected type '{expected}', got {found}")]
    Type {
        path: String,
        expected: &'static str,
        found: String,
    },

    #[error("'{path}': {message}")]
    Hook { path: String, message: String },

    #[error("'{path}' has invalid keys: {}", keys.join(", "))]
    UnusedKeys { path: String, keys: Vec<String> },

    #[error("'{path}': {message}")]
    Message { path: String, message: String },
}

impl DecodeError {
    /// Dotted path of the value that failed to decode
    pub fn path(&self) -> &str {
        match self {
            Self::Type { path, .. }
            | Self::Hook { path, .. }
            | Self::UnusedKeys { path, .. }
            | Self::Message { path, .. } => path,
        }
    }

    /// Attaches `path` to errors produced by serde visitors, which know nothing
    /// about where they are in the tree.
    pub(crate) fn with_path(self, path: &str) -> Self {
        match self {
            Self::Message { path: current, message } if current.is_empty() => Self::Message {
                path: path_label(path),
                message,
            },
            other => other,
        }
    }
}

impl serde::de::Error for DecodeError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Message {
            path: String::new(),
            message: msg.to_string(),
        }
    }
}

/// Printable form of a dotted path; the top of the tree has no name of its own.
pub(crate) fn path_label(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}
