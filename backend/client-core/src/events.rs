//! Events published to the presentation layer.
//!
//! The core never touches a UI thread. Front ends subscribe to a broadcast
//! channel and marshal these onto their own loop.

use crate::discovery::ScanReport;

use models::ConnectionState;

/// Capacity of the event channel. A receiver that falls further behind than
/// this observes `RecvError::Lagged` and should re-read the current state.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The connection manager moved to a new state.
    StateChanged(ConnectionState),
    /// New status line text.
    Status(String),
    /// A scan began; any previous result list is now stale.
    ScanStarted,
    /// A scan ended, with every server it found.
    ScanFinished(ScanReport),
}
