use client_core::error::ClientError;
use client_core::error::config::ConfigError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error;

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum AppError {
    /// Error from this app (logging, terminal, signals)
    #[error("Bridge Remote Error: {message} {location}")]
    App {
        message: String,
        location: ErrorLocation,
    },

    /// Error from client-core operations
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        /// Text suitable for the user, without internals
        status: String,
        location: ErrorLocation,
    },
}

impl AppError {
    #[track_caller]
    pub fn app(message: impl Into<String>) -> Self {
        AppError::App {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// One line for the terminal.
    pub fn user_message(&self) -> String {
        match self {
            AppError::App { message, .. } => message.clone(),
            AppError::Core { status, .. } => status.clone(),
        }
    }
}

impl From<ClientError> for AppError {
    #[track_caller]
    fn from(error: ClientError) -> Self {
        AppError::Core {
            status: error.status_text(),
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for AppError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        AppError::Core {
            status: String::from("Configuration is invalid, see the log for details"),
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
