//! Shared primitives for the bridge remote workspace.
//!
//! Everything here is dependency-light so that `models`, `client-core` and
//! the command-line front end can all agree on the same error location and
//! status code types.

pub mod error;
pub mod http_status;

#[cfg(test)]
mod tests;

pub use error::error_location::ErrorLocation;
pub use http_status::HttpStatusCode;
