pub mod durations;

use crate::error::config::ConfigError;
use crate::{APP_DIR_NAME, BRIDGE_DEFAULT_PORT};

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "remote.toml";
const CONFIG_VERSION: u32 = 1;
const MIN_SCAN_PREFIX: u8 = 16;
const MAX_SCAN_PREFIX: u8 = 30;

pub const ENV_DEFAULT_PORT: &str = "BRIDGE_DEFAULT_PORT";
pub const ENV_DATA_DIR: &str = "BRIDGE_DATA_DIR";
pub const ENV_SCAN_TIMEOUT: &str = "BRIDGE_SCAN_TIMEOUT";

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Port substituted when the typed port text does not parse.
    #[serde(default = "default_port")]
    pub default_port: u16,

    /// Hard ceiling on a single connect handshake.
    #[serde(default = "default_handshake_timeout", with = "durations")]
    pub handshake_timeout: Duration,

    /// Re-probe a connected bridge this often. Disabled when absent.
    #[serde(
        default,
        with = "durations::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub liveness_interval: Option<Duration>,

    /// How long failed liveness probes are retried before the session is
    /// declared lost.
    #[serde(default = "default_liveness_grace", with = "durations")]
    pub liveness_grace: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            default_port: default_port(),
            handshake_timeout: default_handshake_timeout(),
            liveness_interval: None,
            liveness_grace: default_liveness_grace(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Port probed on every candidate address.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Budget for a whole scan.
    #[serde(default = "default_scan_timeout", with = "durations")]
    pub timeout: Duration,

    /// Budget for one candidate.
    #[serde(default = "default_probe_timeout", with = "durations")]
    pub probe_timeout: Duration,

    /// Upper bound on simultaneous probes.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Networks wider than this prefix are narrowed to the block holding our
    /// own address.
    #[serde(default = "default_min_prefix")]
    pub min_prefix: u8,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            timeout: default_scan_timeout(),
            probe_timeout: default_probe_timeout(),
            concurrency: default_concurrency(),
            min_prefix: default_min_prefix(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where the last-connection record lives. Platform data dir when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            connection: ConnectionConfig::default(),
            discovery: DiscoveryConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_port() -> u16 {
    BRIDGE_DEFAULT_PORT
}
fn default_handshake_timeout() -> Duration {
    Duration::from_secs(5)
}
fn default_liveness_grace() -> Duration {
    Duration::from_secs(10)
}
fn default_scan_timeout() -> Duration {
    Duration::from_secs(3)
}
fn default_probe_timeout() -> Duration {
    Duration::from_millis(750)
}
fn default_concurrency() -> usize {
    64
}
fn default_min_prefix() -> u8 {
    24
}

/// Platform config directory for this app (`~/.config/bridge-remote` on Linux).
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
}

/// Platform data directory for this app (`~/.local/share/bridge-remote` on Linux).
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_DIR_NAME))
}

/// Load `.env` from the working directory, if there is one.
///
/// Returns the path that was loaded.
pub fn try_load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            info!("Loaded .env from: {}", path.display());
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            warn!("Failed to parse .env: {e}");
            None
        }
    }
}

// ============================================
// IMPLEMENTATION
// ============================================

impl ClientConfig {
    /// Load config from {config_dir}/remote.toml.
    ///
    /// # Returns
    ///
    /// Returns `Ok(ClientConfig)` if loaded successfully or defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is unreadable or invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: ClientConfig = toml::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config TOML: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/remote.toml using temp file + rename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, serialization, directory creation,
    /// write or rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let contents = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, contents).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Apply `BRIDGE_*` environment variables on top of the loaded values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvOverride`] if a variable is set but unparsable.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var(ENV_DEFAULT_PORT) {
            let port = value
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::EnvOverride {
                    location: ErrorLocation::from(Location::caller()),
                    variable: ENV_DEFAULT_PORT,
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
            info!("{ENV_DEFAULT_PORT} overrides default port with {port}");
            self.connection.default_port = port;
            self.discovery.port = port;
        }

        if let Ok(value) = std::env::var(ENV_DATA_DIR)
            && !value.trim().is_empty()
        {
            info!("{ENV_DATA_DIR} overrides storage directory with {value}");
            self.storage.directory = Some(PathBuf::from(value));
        }

        if let Ok(value) = std::env::var(ENV_SCAN_TIMEOUT) {
            let timeout =
                humantime::parse_duration(value.trim()).map_err(|e| ConfigError::EnvOverride {
                    location: ErrorLocation::from(Location::caller()),
                    variable: ENV_SCAN_TIMEOUT,
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
            info!("{ENV_SCAN_TIMEOUT} overrides scan timeout with {value}");
            self.discovery.timeout = timeout;
        }

        self.validate()
    }

    /// Directory holding the last-connection record.
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .directory
            .clone()
            .or_else(default_data_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |reason: String| ConfigError::ValidationError {
            location: ErrorLocation::from(Location::caller()),
            reason,
        };

        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(fail(format!(
                "Invalid version: {} (expected 1-{})",
                self.version, CONFIG_VERSION
            )));
        }

        if self.connection.default_port == 0 {
            return Err(fail(String::from("connection.default_port cannot be 0")));
        }

        if self.connection.handshake_timeout.is_zero() {
            return Err(fail(String::from("connection.handshake_timeout cannot be 0")));
        }

        if self.connection.liveness_interval.is_some_and(|d| d.is_zero()) {
            return Err(fail(String::from("connection.liveness_interval cannot be 0")));
        }

        if self.discovery.port == 0 {
            return Err(fail(String::from("discovery.port cannot be 0")));
        }

        if self.discovery.timeout.is_zero() || self.discovery.probe_timeout.is_zero() {
            return Err(fail(String::from("discovery timeouts cannot be 0")));
        }

        if self.discovery.concurrency == 0 {
            return Err(fail(String::from("discovery.concurrency cannot be 0")));
        }

        if !(MIN_SCAN_PREFIX..=MAX_SCAN_PREFIX).contains(&self.discovery.min_prefix) {
            return Err(fail(format!(
                "Invalid discovery.min_prefix: {} (must be {MIN_SCAN_PREFIX}-{MAX_SCAN_PREFIX})",
                self.discovery.min_prefix
            )));
        }

        Ok(())
    }
}
