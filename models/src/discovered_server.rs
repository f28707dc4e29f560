use crate::endpoint::Endpoint;

use serde::Serialize;

/// A bridge found by a single discovery scan.
///
/// Transient: scan results are rebuilt from scratch every time and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DiscoveredServer {
    pub endpoint: Endpoint,
    /// Machine name the bridge reported about itself, if any.
    pub label: Option<String>,
}

impl DiscoveredServer {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.label = if label.trim().is_empty() {
            None
        } else {
            Some(label)
        };
        self
    }

    /// Address string handed to the UI list (`host:port`).
    pub fn address(&self) -> String {
        self.endpoint.to_string()
    }

    /// `label (host:port)` when labelled, otherwise just the address.
    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) => format!("{label} ({})", self.endpoint),
            None => self.address(),
        }
    }
}
