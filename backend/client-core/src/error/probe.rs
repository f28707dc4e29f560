//! Error types for bridge health probes.
//!
//! - Transport failures are categorised from `reqwest::Error` flags, never
//!   from message text
//! - Every variant maps onto a user-facing [`FailureReason`]

use common::{ErrorLocation, HttpStatusCode};
use models::FailureReason;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ProbeError {
    #[error("Probe Timeout: {url} {location}")]
    Timeout { url: String, location: ErrorLocation },

    #[error("Probe Refused: {url}: {message} {location}")]
    Refused {
        url: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Probe Unrecognized: {url}: {detail} {location}")]
    Unrecognized {
        url: String,
        detail: String,
        status_code: Option<HttpStatusCode>,
        location: ErrorLocation,
    },

    #[error("Probe Transport Error: {url}: {message} {location}")]
    Transport {
        url: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Probe URL Error: {message} {location}")]
    InvalidUrl {
        message: String,
        location: ErrorLocation,
    },

    #[error("Probe Client Error: {message} {location}")]
    Client {
        message: String,
        location: ErrorLocation,
    },
}

impl ProbeError {
    #[track_caller]
    pub fn timeout(url: impl Into<String>) -> Self {
        ProbeError::Timeout {
            url: url.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unrecognized(
        url: impl Into<String>,
        detail: impl Into<String>,
        status_code: Option<HttpStatusCode>,
    ) -> Self {
        ProbeError::Unrecognized {
            url: url.into(),
            detail: detail.into(),
            status_code,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Categorise a reqwest failure.
    #[track_caller]
    pub fn from_reqwest(url: impl Into<String>, error: &reqwest::Error) -> Self {
        let url = url.into();

        // Check specific flags BEFORE converting to string
        if error.is_timeout() {
            return ProbeError::Timeout {
                url,
                location: ErrorLocation::from(Location::caller()),
            };
        }

        if error.is_connect() {
            return ProbeError::Refused {
                url,
                message: error.to_string(),
                location: ErrorLocation::from(Location::caller()),
            };
        }

        if error.is_decode() {
            return ProbeError::Unrecognized {
                url,
                detail: String::from("unreadable health reply"),
                status_code: error.status().map(|s| HttpStatusCode(s.as_u16())),
                location: ErrorLocation::from(Location::caller()),
            };
        }

        if let Some(status) = error.status() {
            return ProbeError::Unrecognized {
                url,
                detail: format!("HTTP {}", status.as_u16()),
                status_code: Some(HttpStatusCode(status.as_u16())),
                location: ErrorLocation::from(Location::caller()),
            };
        }

        ProbeError::Transport {
            url,
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// User-facing reason this probe failure collapses into.
    pub fn failure_reason(&self) -> FailureReason {
        match self {
            ProbeError::Timeout { .. } => FailureReason::Timeout,
            ProbeError::Refused { .. } => FailureReason::Refused,
            ProbeError::Unrecognized { detail, .. } => FailureReason::Unrecognized(detail.clone()),
            ProbeError::Transport { .. } => {
                FailureReason::Transport(String::from("request failed"))
            }
            ProbeError::InvalidUrl { .. } => {
                FailureReason::Transport(String::from("invalid address"))
            }
            ProbeError::Client { .. } => {
                FailureReason::Transport(String::from("HTTP client unavailable"))
            }
        }
    }

    /// Whether a liveness check should try again before giving up.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProbeError::Timeout { .. } => true,
            ProbeError::Refused { .. } => true,
            ProbeError::Transport { .. } => true,
            ProbeError::Unrecognized { status_code, .. } => {
                status_code.is_some_and(|s| s.is_transient())
            }
            ProbeError::InvalidUrl { .. } => false,
            ProbeError::Client { .. } => false,
        }
    }

    /// Get error category for log lines.
    pub fn error_category(&self) -> &'static str {
        match self {
            ProbeError::Timeout { .. } => "timeout",
            ProbeError::Refused { .. } => "refused",
            ProbeError::Unrecognized { .. } => "unrecognized",
            ProbeError::Transport { .. } => "transport",
            ProbeError::InvalidUrl { .. } => "invalid_url",
            ProbeError::Client { .. } => "client",
        }
    }
}

impl From<url::ParseError> for ProbeError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        ProbeError::InvalidUrl {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
