use std::fmt;
use std::io;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::error::{RegistryError, Result};
use crate::domain::models::{ConfigFormat, ReadOption};
use crate::domain::ports::Registry;
use crate::infrastructure::config::TreeView;

/// Fixed timeout for a single fetch from the config server
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Header carrying the static API token
pub const TOKEN_HEADER: &str = "X-Token";

/// Connection settings for a remote config server
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Base address, e.g. `https://config.internal`
    pub address: String,

    /// Static token sent in the `X-Token` header
    pub api_token: String,

    /// Repository path appended to the address
    pub repo: String,
}

impl fmt::Debug for RemoteSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSettings")
            .field("address", &self.address)
            .field("api_token", &"[REDACTED]")
            .field("repo", &self.repo)
            .finish()
    }
}

/// Registry populated from a remote HTTP config server.
///
/// `read_config` performs a single `GET <address>/<repo>` with the token
/// header and a 5 second timeout, then parses the body as YAML. There is no
/// retry; callers wanting one wrap the call themselves.
#[derive(Clone)]
pub struct RemoteRegistry {
    address: String,
    api_token: String,
    repo: String,
    view: TreeView,
}

impl RemoteRegistry {
    /// Creates a registry for `address`/`repo`; slashes around `repo` are trimmed.
    pub fn new(address: impl Into<String>, api_token: impl Into<String>, repo: &str) -> Self {
        Self {
            address: address.into(),
            api_token: api_token.into(),
            repo: repo.trim_matches('/').to_string(),
            view: TreeView::new(),
        }
    }

    /// Creates a registry from decoded connection settings.
    pub fn from_settings(settings: RemoteSettings) -> Self {
        Self::new(settings.address, settings.api_token, &settings.repo)
    }

    /// URL fetched by `read_config`.
    pub fn url(&self) -> String {
        format!("{}/{}", self.address, self.repo)
    }

    fn with_view(&self, view: TreeView) -> Self {
        Self {
            address: self.address.clone(),
            api_token: self.api_token.clone(),
            repo: self.repo.clone(),
            view,
        }
    }

    fn fetch(&self) -> Result<String> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let response = client
            .get(self.url())
            .header(TOKEN_HEADER, &self.api_token)
            .send()?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), "config server rejected request");
            return Err(RegistryError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes()?;
        debug!(bytes = bytes.len(), "config fetched");
        String::from_utf8(bytes.to_vec())
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err).into())
    }
}

impl fmt::Debug for RemoteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteRegistry")
            .field("address", &self.address)
            .field("api_token", &"[REDACTED]")
            .field("repo", &self.repo)
            .field("view", &self.view)
            .finish()
    }
}

impl Registry for RemoteRegistry {
    fn view(&self) -> &TreeView {
        &self.view
    }

    fn root(&self) -> Self {
        self.with_view(self.view.root())
    }

    fn value_of(&self, key: &str) -> Option<Self> {
        self.view.value_of(key).map(|view| self.with_view(view))
    }

    fn scoped(&self, key: &str) -> Self {
        self.with_view(self.view.scoped(key))
    }

    /// Fetches the repository from the config server; `options` are ignored.
    #[instrument(skip_all, fields(url = %self.url()))]
    fn read_config(&mut self, _options: Vec<ReadOption<'_>>) -> Result<()> {
        let body = self.fetch()?;
        self.view.set_format(ConfigFormat::Yaml.as_str());
        self.view.load(ConfigFormat::Yaml, &body)
    }
}
