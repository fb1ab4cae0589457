//! Port trait definitions
//!
//! - Registry: navigation, defaults, loading and decoding of configuration
//!
//! Concrete registries live in the infrastructure layer.

pub mod registry;

pub use registry::Registry;
