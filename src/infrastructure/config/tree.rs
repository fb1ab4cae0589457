use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use figment::value::{Dict, Value as TreeValue};
use figment::{Figment, Profile, Provider};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::domain::error::{RegistryError, Result};
use crate::domain::models::ConfigFormat;
use crate::infrastructure::decode::{parse_duration, DecodeOption, DecoderConfig};

/// Flattened settings of a view, as handed to the decoder
pub type Settings = Map<String, Value>;

/// Characters that mark a duration string as carrying its own unit.
const DURATION_UNIT_CHARS: &str = "nsuµmh";

/// One node of the shared configuration tree.
///
/// Defaults and loaded data are kept apart and only composed on read, with
/// loaded data on top. All keys are stored lowercase.
#[derive(Debug, Default)]
struct Tree {
    defaults: Dict,
    loaded: Dict,
    format: Option<String>,
}

impl Tree {
    fn shared(defaults: Dict, loaded: Dict) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            defaults,
            loaded,
            format: None,
        }))
    }

    fn figment(&self) -> Figment {
        Figment::from(Serialized::defaults(&self.defaults))
            .merge(Serialized::defaults(&self.loaded))
    }

    /// Layers `defaults` over the existing ones; the newest default wins.
    fn add_defaults(&mut self, defaults: &Dict) -> Result<()> {
        self.defaults = Figment::from(Serialized::defaults(&self.defaults))
            .merge(Serialized::defaults(defaults))
            .extract()?;
        Ok(())
    }
}

/// A view over a configuration tree.
///
/// `current` is the subtree this view addresses. `root` points back at the tree
/// the first view was created over; it is `None` on that first view, which
/// then stands in for the root itself. Loaded data always wins over defaults,
/// whichever was set first. Keys are case-insensitive.
#[derive(Debug, Clone)]
pub struct TreeView {
    current: Rc<RefCell<Tree>>,
    root: Option<Rc<RefCell<Tree>>>,
    scope: Option<String>,
}

impl Default for TreeView {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeView {
    /// Creates an empty root view.
    pub fn new() -> Self {
        Self {
            current: Rc::default(),
            root: None,
            scope: None,
        }
    }

    fn root_tree(&self) -> &Rc<RefCell<Tree>> {
        self.root.as_ref().unwrap_or(&self.current)
    }

    /// View over the top-level tree. Calling it on a root view yields an
    /// equivalent root view.
    #[must_use]
    pub fn root(&self) -> Self {
        Self {
            current: Rc::clone(self.root_tree()),
            root: None,
            scope: None,
        }
    }

    /// True when this view addresses the top-level tree.
    pub fn is_root(&self) -> bool {
        self.root
            .as_ref()
            .is_none_or(|root| Rc::ptr_eq(root, &self.current))
    }

    /// View over the subtree at `key`, or `None` when `key` is missing or does
    /// not hold a map.
    pub fn value_of(&self, key: &str) -> Option<Self> {
        let key = key.to_lowercase();
        let current = self.current.borrow();
        match current.figment().find_value(&key) {
            Ok(TreeValue::Dict(..)) => Some(Self {
                current: Tree::shared(
                    subtree(&current.defaults, &key),
                    subtree(&current.loaded, &key),
                ),
                root: Some(Rc::clone(self.root_tree())),
                scope: None,
            }),
            Ok(_) => {
                trace!(%key, "value is not a subtree");
                None
            }
            Err(_) => {
                trace!(%key, "no value at key");
                None
            }
        }
    }

    /// Same view, with decoding restricted to the entry at `key`.
    #[must_use]
    pub fn scoped(&self, key: impl Into<String>) -> Self {
        Self {
            scope: Some(key.into()),
            ..self.clone()
        }
    }

    /// Scope key set on this view, if any.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Registers a default for `key` on the root tree and on this subtree.
    ///
    /// A value that cannot be represented in the tree (a map with non-string
    /// keys, for one) is logged and skipped, leaving the tree untouched.
    pub fn set_default<V: Serialize>(&self, key: &str, value: V) {
        let defaults = match default_layer(key, &value) {
            Ok(defaults) => defaults,
            Err(error) => {
                warn!(key, %error, "default skipped: value cannot be stored in the config tree");
                return;
            }
        };
        let trees = self.root.iter().chain(std::iter::once(&self.current));
        for tree in trees {
            if let Err(error) = tree.borrow_mut().add_defaults(&defaults) {
                warn!(key, %error, "default skipped");
            }
        }
    }

    /// Declares the format the next load parses.
    pub fn set_format(&self, format: &str) {
        self.current.borrow_mut().format = Some(format.to_string());
    }

    /// Format declared on this view's tree.
    pub fn declared_format(&self) -> Result<ConfigFormat> {
        self.current
            .borrow()
            .format
            .as_deref()
            .unwrap_or_default()
            .parse()
    }

    /// Parses `source` as `format`, replacing previously loaded data.
    ///
    /// Defaults are kept. The source is parsed eagerly so malformed input
    /// fails here and leaves the tree as it was.
    pub fn load(&self, format: ConfigFormat, source: &str) -> Result<()> {
        let loaded = match format {
            ConfigFormat::Yaml => parse(format, Yaml::string(source)),
            ConfigFormat::Json => parse(format, Json::string(source)),
            ConfigFormat::Toml => parse(format, Toml::string(source)),
        }?;
        self.current.borrow_mut().loaded = loaded;
        debug!(%format, bytes = source.len(), "config source loaded");
        Ok(())
    }

    /// Every setting of this view, defaults included.
    pub fn settings(&self) -> Result<Settings> {
        Ok(self.current.borrow().figment().extract()?)
    }

    /// Raw value at the dotted `key`, if present.
    pub fn lookup(&self, key: &str) -> Result<Option<Value>> {
        let settings = self.settings()?;
        Ok(find_path(&settings, &key.to_lowercase()).cloned())
    }

    /// Whether the dotted `key` holds a value.
    pub fn is_set(&self, key: &str) -> bool {
        self.lookup(key).is_ok_and(|value| value.is_some())
    }

    /// Decodes the value at `key` with the default decoder configuration.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.lookup(key)?
            .map(|value| DecoderConfig::default().decode(value))
            .transpose()
            .map_err(RegistryError::from)
    }

    /// Duration at `key`. Strings without a unit count as nanoseconds.
    pub fn get_duration(&self, key: &str) -> Option<Duration> {
        match self.lookup(key).ok()?? {
            Value::String(text) if !text.contains(|c: char| DURATION_UNIT_CHARS.contains(c)) => {
                parse_duration(&format!("{}ns", text.trim())).ok()
            }
            value => DecoderConfig::default().decode(value).ok(),
        }
    }

    /// Decodes this view, or the entry at the scope key, into `T`.
    pub fn unmarshal<T: DeserializeOwned>(&self, options: &[DecodeOption]) -> Result<T> {
        let mut settings = self.settings()?;
        let input = match &self.scope {
            Some(key) => settings
                .remove(&key.to_lowercase())
                .ok_or_else(|| RegistryError::KeyNotFound(key.clone()))?,
            None => Value::Object(settings),
        };
        let config = DecoderConfig::default().with_options(options);
        trace!(?config, scope = ?self.scope, "decoding config");
        Ok(config.decode(input)?)
    }

    /// Owned copy of this view's tree, free to cross threads.
    pub fn snapshot(&self) -> Figment {
        self.current.borrow().figment()
    }
}

fn parse<P: Provider>(format: ConfigFormat, provider: P) -> Result<Dict> {
    let mut data = provider.data().map_err(|source| RegistryError::Parse {
        format,
        source: Box::new(source),
    })?;
    Ok(lowercase_keys(data.remove(&Profile::Default).unwrap_or_default()))
}

fn default_layer<V: Serialize>(key: &str, value: &V) -> Result<Dict> {
    let mut data = Serialized::default(&key.to_lowercase(), value).data()?;
    Ok(lowercase_keys(data.remove(&Profile::Default).unwrap_or_default()))
}

fn lowercase_keys(dict: Dict) -> Dict {
    dict.into_iter()
        .map(|(key, value)| {
            let value = match value {
                TreeValue::Dict(tag, nested) => TreeValue::Dict(tag, lowercase_keys(nested)),
                other => other,
            };
            (key.to_lowercase(), value)
        })
        .collect()
}

/// Copy of the map at the dotted `key`; empty when there is none.
fn subtree(dict: &Dict, key: &str) -> Dict {
    let mut node = dict;
    for part in key.split('.') {
        match node.get(part) {
            Some(TreeValue::Dict(_, child)) => node = child,
            _ => return Dict::new(),
        }
    }
    node.clone()
}

fn find_path<'a>(settings: &'a Settings, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let first = settings.get(parts.next()?)?;
    parts.try_fold(first, |value, part| value.as_object()?.get(part))
}
