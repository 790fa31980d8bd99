//! Integration tests for file loading.

use std::io::Write;

use batt_config::{BattConfig, ConfigError, ConfigLoader, LogFormat};
use tempfile::NamedTempFile;
use tokio_test::{assert_err, assert_ok};

fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_toml_file() {
    let file = temp_file(
        ".toml",
        r#"
        [binding]
        validate = false

        [tasks]
        max_workers = 2
        queue_capacity = 8

        [cache]
        addresses = ["127.0.0.1:6379"]
        username = "app"
        password = "secret"

        [logging]
        level = "batt_tasks=debug,info"
        format = "pretty"
        "#,
    );

    let loader = assert_ok!(ConfigLoader::new().with_file(file.path()));
    assert!(loader.file_loaded());
    let config = assert_ok!(loader.load());

    assert!(!config.binding.validate);
    assert_eq!(config.tasks.pool_config().queue_capacity, 8);
    assert!(config.cache.is_remote());
    assert_eq!(config.cache.username.as_deref(), Some("app"));
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
fn test_load_json_file() {
    let file = temp_file(".json", r#"{"tasks": {"max_attempts": 7}}"#);

    let config = assert_ok!(assert_ok!(ConfigLoader::new().with_file(file.path())).load());
    assert_eq!(config.tasks.max_attempts, 7);
    assert_eq!(config.logging, BattConfig::default().logging);
}

#[test]
fn test_missing_file() {
    let err = assert_err!(ConfigLoader::new().with_file("/nonexistent/batt.toml"));
    assert!(matches!(err, ConfigError::FileNotFound { .. }));

    let loader = assert_ok!(ConfigLoader::new().with_optional_file("/nonexistent/batt.toml"));
    assert!(!loader.file_loaded());
}

#[test]
fn test_unknown_field_in_file() {
    let file = temp_file(".toml", "[tasks]\nworkers = 2\n");
    let err = assert_err!(ConfigLoader::new().with_file(file.path()));
    assert!(matches!(err, ConfigError::TomlError(_)));
}

#[test]
fn test_unsupported_extension() {
    let file = temp_file(".yaml", "tasks: {}\n");
    let err = assert_err!(ConfigLoader::new().with_file(file.path()));
    assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
}

#[test]
fn test_load_validates_but_unvalidated_does_not() {
    let toml = "[tasks]\nmax_workers = 0\n";

    let err = assert_err!(assert_ok!(ConfigLoader::new().with_string(toml, "toml")).load());
    assert!(err.to_string().contains("tasks.max_workers"));

    let config = assert_ok!(
        assert_ok!(ConfigLoader::new().with_string(toml, "toml")).load_unvalidated()
    );
    assert_eq!(config.tasks.max_workers, 0);
}

#[test]
fn test_invalid_log_filter_rejected() {
    let toml = "[logging]\nlevel = \"batt=nonsense\"\n";
    let err = assert_err!(assert_ok!(ConfigLoader::new().with_string(toml, "toml")).load());
    assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "logging.level"));
}

#[test]
fn test_file_layer_replaces_preset() {
    let file = temp_file(".toml", "[tasks]\nmax_workers = 3\n");
    let config = assert_ok!(assert_ok!(
        ConfigLoader::new().with_development().with_file(file.path())
    )
    .load());

    assert_eq!(config.tasks.max_workers, 3);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_dotenv_file_feeds_env_overrides() {
    // A prefix no other test uses, so the process environment stays private.
    let file = temp_file(
        ".env",
        "BATTDOTENVTEST__TASKS__MAX_WORKERS=5\nBATTDOTENVTEST__CACHE__ADDRESSES=redis-a:6379,redis-b:6379\n",
    );

    let loader = assert_ok!(ConfigLoader::new().with_dotenv_file(file.path()));
    let config = assert_ok!(loader.with_env_prefix("battdotenvtest").load());

    assert_eq!(config.tasks.max_workers, 5);
    assert_eq!(config.cache.addresses, vec!["redis-a:6379", "redis-b:6379"]);
}
