pub mod config;
pub mod connection;
pub mod discovery;
pub mod error;
pub mod events;
pub mod probe;
pub mod remote_client;
pub mod storage;

#[cfg(test)]
mod tests;

pub use events::ClientEvent;
pub use remote_client::RemoteClient;

/// Port the desktop bridge listens on unless configured otherwise.
pub const BRIDGE_DEFAULT_PORT: u16 = 5000;
/// Value of the `service` field a bridge reports from its health route.
pub const BRIDGE_SERVICE_ID: &str = "scraper-bridge";
pub const BRIDGE_HEALTH_ENDPOINT: &str = "api/health";
/// Directory name used under the platform config and data directories.
pub const APP_DIR_NAME: &str = "bridge-remote";
pub const BRIDGE_USER_AGENT: &str =
    const_format::concatcp!(APP_DIR_NAME, "/", env!("CARGO_PKG_VERSION"));
