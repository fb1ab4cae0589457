//! Decode pipeline
//!
//! Turns a config subtree into a caller-supplied type:
//! - hooks rewrite values ahead of each typed request
//! - weak typing coerces mismatched scalars
//! - field and variant names match case-insensitively

pub mod config;
mod deserializer;
pub mod duration;
pub mod error;
pub mod hooks;

pub use config::{DecodeOption, DecoderConfig, DEFAULT_SLICE_SEPARATOR};
pub use duration::parse_duration;
pub use error::DecodeError;
pub use hooks::{hook_fn, DecodeHook, FnHook, StringToDuration, StringToSlice, Target};
