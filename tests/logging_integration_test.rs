// Integration tests for logging initialisation
// Kept in their own binary: the global subscriber can only be installed once.

use configer::{init_logging, LocalRegistry, LogConfig, LogFormat, ReadOption, Registry};

#[test]
fn test_logging_from_registry_config() {
    let mut registry = LocalRegistry::new();
    registry.set_config_type("yaml");
    registry.set_config("logging.level", "info");
    registry
        .read_config(vec![ReadOption::stream(
            "logging:\n  format: pretty\n  with_target: false\n".as_bytes(),
        )])
        .unwrap();

    let config: LogConfig = registry
        .value_of("logging")
        .unwrap()
        .unmarshal(&[])
        .unwrap();
    assert_eq!(config.level, "info");
    assert_eq!(config.format, LogFormat::Pretty);
    assert!(!config.with_target);

    init_logging(&config).expect("First initialisation should succeed");
    tracing::info!(key = "value", "logging initialised");

    // Registry operations emit events through the installed subscriber
    assert!(registry.is_set("logging.format"));

    let err = init_logging(&LogConfig::default()).unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_invalid_level_is_rejected() {
    let config = LogConfig {
        level: "verbose".to_string(),
        ..LogConfig::default()
    };
    assert!(init_logging(&config).is_err());
}
