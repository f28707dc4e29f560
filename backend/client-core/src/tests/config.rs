use crate::BRIDGE_DEFAULT_PORT;
use crate::config::{ClientConfig, ENV_DATA_DIR, ENV_DEFAULT_PORT, ENV_SCAN_TIMEOUT};
use crate::error::config::ConfigError;

use std::path::PathBuf;
use std::time::Duration;

use serial_test::serial;
use tempfile::TempDir;

fn clear_env() {
    // SAFETY: every test touching these variables is #[serial]
    unsafe {
        std::env::remove_var(ENV_DEFAULT_PORT);
        std::env::remove_var(ENV_DATA_DIR);
        std::env::remove_var(ENV_SCAN_TIMEOUT);
    }
}

fn set_env(key: &str, value: &str) {
    // SAFETY: every test touching these variables is #[serial]
    unsafe { std::env::set_var(key, value) }
}

#[test]
fn given_no_config_file_when_loaded_then_returns_defaults() {
    let dir = TempDir::new().unwrap();

    let config = ClientConfig::load(dir.path()).unwrap();

    assert_eq!(config, ClientConfig::default());
    assert_eq!(config.connection.default_port, BRIDGE_DEFAULT_PORT);
    assert_eq!(config.connection.handshake_timeout, Duration::from_secs(5));
    assert_eq!(config.connection.liveness_interval, None);
    assert_eq!(config.discovery.timeout, Duration::from_secs(3));
    assert_eq!(config.discovery.probe_timeout, Duration::from_millis(750));
    assert_eq!(config.discovery.concurrency, 64);
    assert_eq!(config.discovery.min_prefix, 24);
}

/// **VALUE**: Verifies a partial config file keeps defaults for everything it omits.
///
/// **WHY THIS MATTERS**: Users edit `remote.toml` by hand and usually set one or two values.
/// Requiring every field would turn a one-line tweak into a startup failure.
///
/// **BUG THIS CATCHES**: Would catch a missing `#[serde(default)]` on a section or field, and
/// durations that are not parsed from human strings.
#[test]
fn given_partial_toml_when_loaded_then_merges_with_defaults() {
    // GIVEN: A config naming only a few values
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("remote.toml"),
        r#"
[connection]
liveness_interval = "15s"

[discovery]
timeout = "1500ms"
concurrency = 16
"#,
    )
    .unwrap();

    // WHEN: Loading it
    let config = ClientConfig::load(dir.path()).unwrap();

    // THEN: Named values are applied, the rest are defaults
    assert_eq!(config.connection.liveness_interval, Some(Duration::from_secs(15)));
    assert_eq!(config.discovery.timeout, Duration::from_millis(1500));
    assert_eq!(config.discovery.concurrency, 16);
    assert_eq!(config.discovery.port, BRIDGE_DEFAULT_PORT);
    assert_eq!(config.connection.handshake_timeout, Duration::from_secs(5));
}

#[test]
fn given_malformed_toml_when_loaded_then_returns_parse_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("remote.toml"), "[discovery\ntimeout = ").unwrap();

    let result = ClientConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn given_unparsable_duration_when_loaded_then_returns_parse_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("remote.toml"),
        "[discovery]\ntimeout = \"soon\"\n",
    )
    .unwrap();

    let result = ClientConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn given_saved_config_when_loaded_then_values_survive() {
    let dir = TempDir::new().unwrap();
    let mut config = ClientConfig::default();
    config.connection.liveness_interval = Some(Duration::from_secs(20));
    config.discovery.min_prefix = 26;
    config.storage.directory = Some(PathBuf::from("/var/lib/bridge-remote"));

    config.save(dir.path()).unwrap();
    let loaded = ClientConfig::load(dir.path()).unwrap();

    assert_eq!(loaded, config);
    assert!(!dir.path().join("remote.toml.tmp").exists());
}

/// **VALUE**: Verifies validation rejects values that would stall or explode a scan.
///
/// **WHY THIS MATTERS**: Zero concurrency never finishes, and a /8 prefix means sixteen
/// million probes. Both should fail at startup with a config error, not hang at runtime.
///
/// **BUG THIS CATCHES**: Would catch `validate()` skipping a field or running with
/// inverted bounds.
#[test]
fn given_invalid_values_when_validated_then_returns_validation_error() {
    let mut zero_concurrency = ClientConfig::default();
    zero_concurrency.discovery.concurrency = 0;
    assert!(matches!(
        zero_concurrency.validate(),
        Err(ConfigError::ValidationError { .. })
    ));

    let mut wide_prefix = ClientConfig::default();
    wide_prefix.discovery.min_prefix = 8;
    assert!(matches!(
        wide_prefix.validate(),
        Err(ConfigError::ValidationError { .. })
    ));

    let mut zero_port = ClientConfig::default();
    zero_port.connection.default_port = 0;
    assert!(zero_port.validate().is_err());

    let mut zero_liveness = ClientConfig::default();
    zero_liveness.connection.liveness_interval = Some(Duration::ZERO);
    assert!(zero_liveness.validate().is_err());

    let mut future_version = ClientConfig::default();
    future_version.version = 99;
    assert!(future_version.validate().is_err());
}

#[test]
#[serial]
fn given_env_overrides_when_applied_then_replace_loaded_values() {
    // GIVEN: All three variables set
    clear_env();
    set_env(ENV_DEFAULT_PORT, "5050");
    set_env(ENV_DATA_DIR, "/tmp/bridge-data");
    set_env(ENV_SCAN_TIMEOUT, "8s");
    let mut config = ClientConfig::default();

    // WHEN: Applying them
    let result = config.apply_env_overrides();
    clear_env();

    // THEN: Each one lands in its field
    assert!(result.is_ok());
    assert_eq!(config.connection.default_port, 5050);
    assert_eq!(config.discovery.port, 5050);
    assert_eq!(config.storage.directory, Some(PathBuf::from("/tmp/bridge-data")));
    assert_eq!(config.data_dir(), PathBuf::from("/tmp/bridge-data"));
    assert_eq!(config.discovery.timeout, Duration::from_secs(8));
}

#[test]
#[serial]
fn given_unparsable_env_port_when_applied_then_returns_env_override_error() {
    clear_env();
    set_env(ENV_DEFAULT_PORT, "fifty");
    let mut config = ClientConfig::default();

    let result = config.apply_env_overrides();
    clear_env();

    match result {
        Err(ConfigError::EnvOverride { variable, value, .. }) => {
            assert_eq!(variable, ENV_DEFAULT_PORT);
            assert_eq!(value, "fifty");
        }
        other => panic!("Expected EnvOverride error, got {other:?}"),
    }
    assert_eq!(config.connection.default_port, BRIDGE_DEFAULT_PORT);
}

#[test]
#[serial]
fn given_no_env_when_applied_then_config_unchanged() {
    clear_env();
    let mut config = ClientConfig::default();

    config.apply_env_overrides().unwrap();

    assert_eq!(config, ClientConfig::default());
}
