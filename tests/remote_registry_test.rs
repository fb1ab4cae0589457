/// Integration tests for the HTTP-backed registry
///
/// These tests run the registry against a mock config server.
///
/// Test coverage:
/// - Request shape: path with trimmed repo, token header
/// - Successful fetch decodes the same as a local read
/// - Non-200 responses surface the server's body
/// - Transport failures and malformed bodies
mod common;

use common::{local_registry, HttpConfig, SERVICE_YAML};
use configer::{Registry, RegistryError, RemoteRegistry, RemoteSettings};
use mockito::Server;
use std::net::TcpListener;
use std::time::Duration;

#[test]
fn test_fetch_success_matches_local_read() {
    common::setup_test_logging();

    // Arrange: config server holding the service repo
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/team/billing")
        .match_header("x-token", "test-token")
        .with_status(200)
        .with_header("content-type", "application/yaml")
        .with_body(SERVICE_YAML)
        .create();

    let mut registry = RemoteRegistry::new(server.url(), "test-token", "/team/billing/");

    // Act
    registry.read_config(Vec::new()).expect("fetch should succeed");

    // Assert
    mock.assert();
    let remote: HttpConfig = registry
        .value_of("service.http")
        .unwrap()
        .unmarshal(&[])
        .unwrap();
    let local: HttpConfig = local_registry(SERVICE_YAML)
        .value_of("service.http")
        .unwrap()
        .unmarshal(&[])
        .unwrap();
    assert_eq!(remote, local);
    assert_eq!(remote.timeout, Duration::from_secs(3));
}

#[test]
fn test_non_200_status_carries_body() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/app")
        .with_status(404)
        .with_body("not authorized")
        .create();

    let mut registry = RemoteRegistry::new(server.url(), "bad-token", "app");
    let err = registry.read_config(Vec::new()).unwrap_err();

    mock.assert();
    assert!(
        matches!(err, RegistryError::RemoteStatus { status: 404, ref body } if body == "not authorized"),
        "unexpected error: {err:?}"
    );
    assert_eq!(
        err.to_string(),
        "config server returned non 200 status. err: not authorized"
    );
    assert!(registry.all_settings().unwrap().is_empty());
}

#[test]
fn test_server_error_is_not_retried() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/app")
        .with_status(503)
        .with_body("maintenance")
        .expect(1)
        .create();

    let mut registry = RemoteRegistry::new(server.url(), "token", "app");
    let err = registry.read_config(Vec::new()).unwrap_err();

    mock.assert();
    assert!(matches!(err, RegistryError::RemoteStatus { status: 503, .. }));
}

#[test]
fn test_transport_error_when_server_is_down() {
    let address = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let mut registry = RemoteRegistry::new(format!("http://{address}"), "token", "app");
    let err = registry.read_config(Vec::new()).unwrap_err();
    assert!(
        matches!(err, RegistryError::Transport(_)),
        "Expected transport error, got {err:?}"
    );
}

#[test]
fn test_malformed_body_is_a_parse_error() {
    let mut server = Server::new();
    server
        .mock("GET", "/app")
        .with_status(200)
        .with_body("service: [unterminated\n")
        .create();

    let mut registry = RemoteRegistry::new(server.url(), "token", "app");
    let err = registry.read_config(Vec::new()).unwrap_err();
    assert!(matches!(err, RegistryError::Parse { .. }));
}

#[test]
fn test_invalid_utf8_body_is_rejected() {
    let mut server = Server::new();
    server
        .mock("GET", "/app")
        .with_status(200)
        .with_body([b'a', b':', b' ', 0xff, 0xfe, b'\n'])
        .create();

    let mut registry = RemoteRegistry::new(server.url(), "token", "app");
    let err = registry.read_config(Vec::new()).unwrap_err();
    assert!(matches!(err, RegistryError::Io(_)), "Expected io error, got {err:?}");
    assert!(registry.all_settings().unwrap().is_empty());
}

#[test]
fn test_registry_from_bootstrap_settings() {
    let mut server = Server::new();
    server
        .mock("GET", "/billing")
        .match_header("x-token", "from-bootstrap")
        .with_status(200)
        .with_body("features:\n  beta: true\n")
        .create();

    let bootstrap = format!(
        "remote:\n  address: {}\n  api_token: from-bootstrap\n  repo: /billing\n",
        server.url()
    );
    let settings: RemoteSettings = local_registry(&bootstrap)
        .value_of("remote")
        .unwrap()
        .unmarshal(&[])
        .unwrap();

    let mut registry = RemoteRegistry::from_settings(settings);
    registry.read_config(Vec::new()).unwrap();
    assert_eq!(registry.get::<bool>("features.beta").unwrap(), Some(true));
}

#[test]
fn test_defaults_survive_remote_load() {
    let mut server = Server::new();
    server
        .mock("GET", "/app")
        .with_status(200)
        .with_body(SERVICE_YAML)
        .create();

    let mut registry = RemoteRegistry::new(server.url(), "token", "app");
    registry.set_config("service.http.retries", 2);
    registry.set_config("service.http.port", 1);
    registry.read_config(Vec::new()).unwrap();

    let http = registry.value_of("service.http").unwrap();
    assert_eq!(http.get::<u8>("retries").unwrap(), Some(2));
    assert_eq!(http.get::<u16>("port").unwrap(), Some(8080));
    assert_eq!(
        http.root().all_settings().unwrap(),
        registry.all_settings().unwrap()
    );
}
