//! Configer - navigable configuration registries
//!
//! A registry is a view over a hierarchical configuration tree. The tree is
//! populated either from a local byte stream or from a remote HTTP config
//! server; either way the same navigation and decoding rules apply.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): the `Registry` contract, option types and errors
//! - **Infrastructure Layer** (`infrastructure`): tree views, the decode
//!   pipeline, concrete registries and logging
//!
//! # Example
//!
//! ```
//! use configer::{LocalRegistry, ReadOption, Registry};
//! use serde::Deserialize;
//! use std::time::Duration;
//!
//! #[derive(Deserialize)]
//! struct Http {
//!     timeout: Duration,
//!     hosts: Vec<String>,
//! }
//!
//! let mut registry = LocalRegistry::new();
//! registry.set_config_type("yaml");
//! registry.set_config("http.timeout", "3s");
//! registry
//!     .read_config(vec![ReadOption::stream("http:\n  hosts: a,b,c\n".as_bytes())])
//!     .unwrap();
//!
//! let http: Http = registry.value_of("http").unwrap().unmarshal(&[]).unwrap();
//! assert_eq!(http.timeout, Duration::from_secs(3));
//! assert_eq!(http.hosts, ["a", "b", "c"]);
//! ```

pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::models::{ConfigFormat, ReadOption};
pub use domain::ports::Registry;
pub use domain::{RegistryError, Result};
pub use infrastructure::config::{Settings, TreeView};
pub use infrastructure::decode::{
    hook_fn, DecodeError, DecodeHook, DecodeOption, DecoderConfig, StringToDuration,
    StringToSlice, Target,
};
pub use infrastructure::logging::{init_logging, LogConfig, LogFormat};
pub use infrastructure::registry::{LocalRegistry, RemoteRegistry, RemoteSettings};
