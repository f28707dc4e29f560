use common::ErrorLocation;
use models::{Endpoint, FailureReason};

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ConnectionError {
    /// The handshake did not produce a recognised bridge reply.
    #[error("Handshake Error: {endpoint}: {reason} {location}")]
    Handshake {
        endpoint: Endpoint,
        reason: FailureReason,
        location: ErrorLocation,
    },
}

impl ConnectionError {
    #[track_caller]
    pub fn handshake(endpoint: Endpoint, reason: FailureReason) -> Self {
        ConnectionError::Handshake {
            endpoint,
            reason,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn reason(&self) -> &FailureReason {
        match self {
            ConnectionError::Handshake { reason, .. } => reason,
        }
    }
}
