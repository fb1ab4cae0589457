//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty stdout output
//! - `RUST_LOG` aware filtering

pub mod config;
pub mod logger;

pub use config::{LogConfig, LogFormat};
pub use logger::init_logging;
