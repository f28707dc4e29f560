//! Domain models for the bridge remote client.
//!
//! This crate contains the plain data structures shared by the connection
//! core and its front ends. The only behaviour here is validation and
//! normalisation of user-supplied values; no I/O happens in this crate.
//!
//! ## Architecture
//!
//! - **models** (this crate): Endpoints, connection states, discovery results
//! - **client-core**: Persistence, probing, discovery and connection lifecycle
//! - **bridge-remote**: Command-line front end wiring everything together

pub mod connection_state;
pub mod discovered_server;
pub mod endpoint;
pub mod error;
pub mod network;

#[cfg(test)]
mod tests;

pub use common::ErrorLocation;
pub use connection_state::{ConnectionState, FailureReason};
pub use discovered_server::DiscoveredServer;
pub use endpoint::{Endpoint, EndpointRecord};
pub use error::model_error::ModelError;
pub use network::Ipv4Network;
