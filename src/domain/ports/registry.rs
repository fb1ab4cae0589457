use std::time::Duration;

use figment::Figment;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::error::Result;
use crate::domain::models::ReadOption;
use crate::infrastructure::config::{Settings, TreeView};
use crate::infrastructure::decode::DecodeOption;

/// Navigable, decodable view over a hierarchical configuration tree.
///
/// Implementations differ only in how the tree is populated; navigation,
/// defaults and decoding are shared through the underlying [`TreeView`].
///
/// # Example
/// ```
/// use configer::{LocalRegistry, ReadOption, Registry};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Section {
///     b: i64,
/// }
///
/// let mut registry = LocalRegistry::new();
/// registry.set_config_type("yaml");
/// registry
///     .read_config(vec![ReadOption::stream("a:\n  b: 5\n".as_bytes())])
///     .unwrap();
///
/// let section: Section = registry.value_of("a").unwrap().unmarshal(&[]).unwrap();
/// assert_eq!(section.b, 5);
/// ```
pub trait Registry: Sized {
    /// The view this registry wraps.
    fn view(&self) -> &TreeView;

    /// View over the top-level tree. Idempotent on a root view.
    #[must_use]
    fn root(&self) -> Self;

    /// View over the subtree at `key`.
    ///
    /// Returns `None` rather than an error when `key` is missing or holds a
    /// scalar; callers are expected to check.
    fn value_of(&self, key: &str) -> Option<Self>;

    /// Same view with decoding restricted to the single entry at `key`.
    #[must_use]
    fn scoped(&self, key: &str) -> Self;

    /// Bulk-loads the tree from this registry's source, replacing data from
    /// any earlier load. Defaults are kept.
    fn read_config(&mut self, options: Vec<ReadOption<'_>>) -> Result<()>;

    /// Registers a default for `key`, visible from both the root and this view
    /// until loaded data overrides it. A later default for the same key
    /// replaces this one.
    fn set_config<V: Serialize>(&self, key: &str, value: V) {
        self.view().set_default(key, value);
    }

    /// Declares the format the next `read_config` parses (`yaml`, `json`, `toml`).
    fn set_config_type(&mut self, format: &str) {
        self.view().set_format(format);
    }

    /// Decodes this view (or the scoped entry) into `T`.
    fn unmarshal<T: DeserializeOwned>(&self, options: &[DecodeOption]) -> Result<T> {
        self.view().unmarshal(options)
    }

    /// Duration stored at `key`; `None` when missing or not a duration.
    ///
    /// Accepts duration strings (`"1h30m"`) and integers. A number without a
    /// unit, as integer or string, counts as nanoseconds.
    fn get_duration(&self, key: &str) -> Option<Duration> {
        self.view().get_duration(key)
    }

    /// Value at `key` decoded with the default decoder configuration.
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.view().get(key)
    }

    /// Whether `key` holds a value, loaded or default.
    fn is_set(&self, key: &str) -> bool {
        self.view().is_set(key)
    }

    /// All settings of this view.
    fn all_settings(&self) -> Result<Settings> {
        self.view().settings()
    }

    /// Immutable copy of this view's tree that can be shared across threads.
    fn snapshot(&self) -> Figment {
        self.view().snapshot()
    }
}
