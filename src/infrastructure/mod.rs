//! Infrastructure layer module
//!
//! This module contains the concrete pieces behind the registry contract:
//! - Configuration tree (figment) and navigable views
//! - Decode pipeline (hooks, weak typing, serde deserializer)
//! - Local and remote registries
//! - Logging infrastructure

pub mod config;
pub mod decode;
pub mod logging;
pub mod registry;
