use std::io::{self, Read};

use tracing::instrument;

use crate::domain::error::{RegistryError, Result};
use crate::domain::models::ReadOption;
use crate::domain::ports::Registry;
use crate::infrastructure::config::TreeView;

/// Registry populated from a byte stream: a file, embedded bytes, a socket.
#[derive(Debug, Clone, Default)]
pub struct LocalRegistry {
    view: TreeView,
}

impl LocalRegistry {
    /// Creates a registry over an empty tree.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Registry for LocalRegistry {
    fn view(&self) -> &TreeView {
        &self.view
    }

    fn root(&self) -> Self {
        Self {
            view: self.view.root(),
        }
    }

    fn value_of(&self, key: &str) -> Option<Self> {
        self.view.value_of(key).map(|view| Self { view })
    }

    fn scoped(&self, key: &str) -> Self {
        Self {
            view: self.view.scoped(key),
        }
    }

    /// Reads the stream given as first option and merges it into the tree.
    ///
    /// A trailing [`ReadOption::Format`] overrides the declared format.
    #[instrument(skip_all, fields(options = options.len()))]
    fn read_config(&mut self, options: Vec<ReadOption<'_>>) -> Result<()> {
        let mut options = options.into_iter();
        let source = match options.next() {
            None => return Err(RegistryError::MissingStream),
            Some(ReadOption::Stream(mut reader)) => {
                let mut buffer = Vec::new();
                reader.read_to_end(&mut buffer)?;
                buffer
            }
            Some(ReadOption::Bytes(bytes)) => bytes,
            Some(other) => return Err(RegistryError::NotAStream(other.kind())),
        };

        let format = match options
            .filter_map(|option| match option {
                ReadOption::Format(format) => Some(format),
                _ => None,
            })
            .last()
        {
            Some(format) => format,
            None => self.view.declared_format()?,
        };

        let text = String::from_utf8(source)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        self.view.load(format, &text)
    }
}
