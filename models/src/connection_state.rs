//! Connection lifecycle states.

use std::fmt::{Display, Formatter, Result as FormatResult};

use serde::Serialize;

/// Why a connection attempt or an established session failed.
///
/// `Display` produces text meant for end users; raw transport errors are
/// logged where they occur and never carried here verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum FailureReason {
    /// No reply within the handshake budget.
    Timeout,
    /// Nothing accepted the connection on that address/port.
    Refused,
    /// Something answered, but it is not a bridge.
    Unrecognized(String),
    /// A connected bridge stopped answering health checks.
    LivenessLost,
    /// Any other network-level failure.
    Transport(String),
}

impl Display for FailureReason {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            Self::Timeout => write!(formatter, "the bridge did not respond in time"),
            Self::Refused => write!(
                formatter,
                "could not reach the bridge, check the IP, port and firewall"
            ),
            Self::Unrecognized(detail) => {
                write!(formatter, "the server is not a scraper bridge ({detail})")
            }
            Self::LivenessLost => write!(formatter, "lost connection to the bridge"),
            Self::Transport(detail) => write!(formatter, "network error ({detail})"),
        }
    }
}

/// The single active state of the connection manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed(FailureReason),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Short lowercase label, used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Failed(_) => "failed",
        }
    }

    /// Whether moving from `self` to `next` is an edge of the lifecycle.
    ///
    /// `Disconnected -> Connecting -> Connected | Failed`,
    /// `Failed -> Connecting | Disconnected`, `Connected -> Disconnected | Failed`.
    pub fn can_transition_to(&self, next: &ConnectionState) -> bool {
        use ConnectionState::*;

        matches!(
            (self, next),
            (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Failed(_))
                | (Failed(_), Connecting)
                | (Failed(_), Disconnected)
                | (Connected, Disconnected)
                | (Connected, Failed(_))
        )
    }
}

impl Display for ConnectionState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            Self::Disconnected => write!(formatter, "Disconnected"),
            Self::Connecting => write!(formatter, "Connecting"),
            Self::Connected => write!(formatter, "Connected"),
            Self::Failed(reason) => write!(formatter, "Failed: {reason}"),
        }
    }
}
