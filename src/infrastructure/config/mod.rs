//! Configuration tree infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML, JSON and TOML sources merged over the tree
//! - Defaults joined underneath loaded data
//! - Navigable views sharing one root

pub mod tree;

pub use tree::{Settings, TreeView};
