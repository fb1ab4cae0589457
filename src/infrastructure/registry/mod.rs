//! Registry implementations
//!
//! - LocalRegistry: tree loaded from a byte stream
//! - RemoteRegistry: tree fetched from an HTTP config server

pub mod local;
pub mod remote;

pub use local::LocalRegistry;
pub use remote::{RemoteRegistry, RemoteSettings, REQUEST_TIMEOUT, TOKEN_HEADER};
