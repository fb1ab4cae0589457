//! Domain layer: the registry contract, its value types and errors.

pub mod error;
pub mod models;
pub mod ports;

pub use error::{RegistryError, Result};
