use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ModelError {
    /// User-supplied text could not be turned into a usable value.
    #[error("Invalid Input: {message} {location}")]
    InvalidInput {
        message: String,
        location: ErrorLocation,
    },

    /// A value violated a structural rule (port range, prefix length).
    #[error("Validation Error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },
}

impl ModelError {
    #[track_caller]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ModelError::InvalidInput {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn validation(message: impl Into<String>) -> Self {
        ModelError::Validation {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Message without the location suffix, suitable for status lines.
    pub fn message(&self) -> &str {
        match self {
            ModelError::InvalidInput { message, .. } => message,
            ModelError::Validation { message, .. } => message,
        }
    }
}
