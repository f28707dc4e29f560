//! Errors surfaced by [`RemoteClient`](crate::RemoteClient) to the presentation layer.
//!
//! Each variant carries a `status_text()` the UI can show verbatim; the
//! `Display` form (with location) is for logs.

use crate::error::connection::ConnectionError;
use crate::error::probe::ProbeError;
use crate::error::storage::StorageError;

use common::ErrorLocation;
use models::{FailureReason, ModelError};

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ClientError {
    #[error("Invalid Input: {message} {location}")]
    InvalidInput {
        message: String,
        location: ErrorLocation,
    },

    #[error("Connect already in progress {location}")]
    Busy { location: ErrorLocation },

    #[error("Not connected to a bridge {location}")]
    NotConnected { location: ErrorLocation },

    #[error("Connect Error: {reason} {location}")]
    Connect {
        reason: FailureReason,
        location: ErrorLocation,
    },

    #[error("Persistence Error: {message} {location}")]
    Persistence {
        message: String,
        location: ErrorLocation,
    },

    #[error("Setup Error: {message} {location}")]
    Setup {
        message: String,
        location: ErrorLocation,
    },
}

impl ClientError {
    #[track_caller]
    pub fn busy() -> Self {
        ClientError::Busy {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn not_connected() -> Self {
        ClientError::NotConnected {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Text for the status line; never contains transport internals.
    pub fn status_text(&self) -> String {
        match self {
            ClientError::InvalidInput { message, .. } => format!("Invalid IP or Port: {message}"),
            ClientError::Busy { .. } => String::from("Already connecting..."),
            ClientError::NotConnected { .. } => String::from("Please connect to the PC first."),
            ClientError::Connect { reason, .. } => format!("Connection failed: {reason}"),
            ClientError::Persistence { .. } => String::from("Could not update saved connection"),
            ClientError::Setup { .. } => String::from("Client could not start"),
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, ClientError::Busy { .. })
    }
}

impl From<ModelError> for ClientError {
    #[track_caller]
    fn from(error: ModelError) -> Self {
        ClientError::InvalidInput {
            message: error.message().to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConnectionError> for ClientError {
    #[track_caller]
    fn from(error: ConnectionError) -> Self {
        ClientError::Connect {
            reason: error.reason().clone(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<StorageError> for ClientError {
    #[track_caller]
    fn from(error: StorageError) -> Self {
        ClientError::Persistence {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ProbeError> for ClientError {
    #[track_caller]
    fn from(error: ProbeError) -> Self {
        ClientError::Setup {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
