//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration test files.

use configer::{LocalRegistry, ReadOption, Registry};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// YAML fixture shared by local and remote tests
#[allow(dead_code)]
pub const SERVICE_YAML: &str = r"
service:
  name: billing
  http:
    port: 8080
    timeout: 3s
    hosts: a,b,c
  db:
    url: postgres://localhost/billing
    pool: '16'
features:
  beta: true
";

/// Typed view of `service.http`
#[allow(dead_code)]
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    pub port: u16,
    pub timeout: Duration,
    pub hosts: Vec<String>,
}

/// Typed view of `service.db`
#[allow(dead_code)]
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct DbConfig {
    pub url: String,
    pub pool: u32,
}

/// Build a local registry loaded from `yaml`
#[allow(dead_code)]
pub fn local_registry(yaml: &str) -> LocalRegistry {
    let mut registry = LocalRegistry::new();
    registry.set_config_type("yaml");
    registry
        .read_config(vec![ReadOption::stream(yaml.as_bytes())])
        .expect("fixture YAML should load");
    registry
}

/// Render `value` as a YAML document
#[allow(dead_code)]
pub fn to_yaml<T: Serialize>(value: &T) -> String {
    serde_yaml::to_string(value).expect("fixture should serialize to YAML")
}

/// Load a YAML rendering of `value` into `registry`, replacing earlier data
#[allow(dead_code)]
pub fn reload<T: Serialize>(registry: &mut LocalRegistry, value: &T) {
    registry.set_config_type("yaml");
    registry
        .read_config(vec![ReadOption::Bytes(to_yaml(value).into_bytes())])
        .expect("fixture YAML should load");
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
