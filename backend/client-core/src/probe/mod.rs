//! Bridge health / identity probe.
//!
//! A probe is a single `GET {base_url}/api/health`. The bridge answers with
//! HTTP 2xx and a JSON body:
//!
//! ```json
//! { "service": "scraper-bridge", "name": "OFFICE-PC", "version": "1.4.0" }
//! ```
//!
//! Anything else that happens to be listening on the port (a router admin
//! page, a dev server) is reported as unrecognised.

use crate::error::probe::ProbeError;
use crate::{BRIDGE_HEALTH_ENDPOINT, BRIDGE_SERVICE_ID, BRIDGE_USER_AGENT};

use common::{ErrorLocation, HttpStatusCode};
use models::Endpoint;

use std::panic::Location;
use std::time::Duration;

use log::{debug, trace};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct HealthReply {
    service: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

/// What a recognised bridge said about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeIdentity {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// HTTP transport used for handshakes, liveness checks and discovery.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct BridgeProbe {
    client: Client,
    timeout: Duration,
}

impl BridgeProbe {
    /// Build a probe whose requests give up after `timeout`.
    ///
    /// Proxies are bypassed: bridges live on the local network.
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(BRIDGE_USER_AGENT)
            .no_proxy()
            .build()
            .map_err(|e| ProbeError::Client {
                message: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Health route for `endpoint`.
    pub fn health_url(endpoint: &Endpoint) -> Result<Url, ProbeError> {
        let base = Url::parse(&format!("{}/", endpoint.base_url()))?;
        Ok(base.join(BRIDGE_HEALTH_ENDPOINT)?)
    }

    /// Ask `endpoint` whether it is a bridge.
    ///
    /// # Errors
    ///
    /// * [`ProbeError::Timeout`] - no reply within the probe timeout
    /// * [`ProbeError::Refused`] - nothing accepted the connection
    /// * [`ProbeError::Unrecognized`] - something replied, but not a bridge
    /// * [`ProbeError::Transport`] - any other request failure
    pub async fn identify(&self, endpoint: &Endpoint) -> Result<BridgeIdentity, ProbeError> {
        let url = Self::health_url(endpoint)?;
        let url_text = url.to_string();

        trace!("Probing {url_text}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(&url_text, &e))?;

        let status = HttpStatusCode(response.status().as_u16());
        if !status.is_success() {
            debug!("Probe of {endpoint} answered HTTP {status}");
            return Err(ProbeError::unrecognized(
                url_text,
                format!("HTTP {status}"),
                Some(status),
            ));
        }

        let reply: HealthReply = response
            .json()
            .await
            .map_err(|e| ProbeError::from_reqwest(&url_text, &e))?;

        if reply.service != BRIDGE_SERVICE_ID {
            debug!(
                "Probe of {endpoint} found service '{}', not a bridge",
                reply.service
            );
            return Err(ProbeError::unrecognized(
                url_text,
                format!("service '{}'", reply.service),
                Some(status),
            ));
        }

        debug!(
            "Bridge at {endpoint} identified (name={:?}, version={:?})",
            reply.name, reply.version
        );

        Ok(BridgeIdentity {
            name: reply.name,
            version: reply.version,
        })
    }
}
