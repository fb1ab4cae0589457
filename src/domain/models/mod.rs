//! Value types shared by every registry implementation.

pub mod format;
pub mod options;

pub use format::ConfigFormat;
pub use options::ReadOption;
