//! Test helpers for client-core integration tests.
//!
//! - Mock bridges answering the health route
//! - Configs with short timeouts so failures surface quickly
//! - An interface source that makes 127.0.0.1 the only scan candidate

use client_core::BRIDGE_SERVICE_ID;
use client_core::config::ClientConfig;
use client_core::discovery::StaticInterfaces;
use client_core::events::ClientEvent;

use models::{ConnectionState, Endpoint, Ipv4Network};

use std::net::{Ipv4Addr, TcpListener};
use std::path::Path;
use std::time::Duration;

use serde_json::json;
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const HEALTH_PATH: &str = "/api/health";

/// Health reply of a bridge named `name`.
pub fn bridge_reply(name: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "service": BRIDGE_SERVICE_ID,
        "name": name,
        "version": "1.4.0",
    }))
}

/// Start a mock bridge that answers every health probe.
pub async fn mock_bridge(name: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(HEALTH_PATH))
        .respond_with(bridge_reply(name))
        .mount(&server)
        .await;
    server
}

/// Start a mock bridge that answers only after `delay`.
pub async fn slow_bridge(name: &str, delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(HEALTH_PATH))
        .respond_with(bridge_reply(name).set_delay(delay))
        .mount(&server)
        .await;
    server
}

/// Start a server that answers the health route as some other service.
pub async fn foreign_service() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(HEALTH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "service": "router-admin" })))
        .mount(&server)
        .await;
    server
}

pub fn endpoint_of(server: &MockServer) -> Endpoint {
    let address = server.address();
    Endpoint::new(address.ip().to_string(), address.port()).unwrap()
}

/// A loopback port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Defaults with short timeouts, storing records under `data_dir`.
pub fn fast_config(data_dir: &Path) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.connection.handshake_timeout = Duration::from_secs(2);
    config.discovery.timeout = Duration::from_secs(2);
    config.discovery.probe_timeout = Duration::from_millis(500);
    config.storage.directory = Some(data_dir.to_path_buf());
    config
}

/// Pretend to sit on 127.0.0.2/30: the only other host is 127.0.0.1.
pub fn loopback_interfaces() -> Box<StaticInterfaces> {
    let own = Ipv4Network::new(Ipv4Addr::new(127, 0, 0, 2), 30).unwrap();
    Box::new(StaticInterfaces::new(vec![own]))
}

/// Drain every state change currently buffered on `rx`.
pub fn drain_states(rx: &mut broadcast::Receiver<ClientEvent>) -> Vec<ConnectionState> {
    let mut states = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let ClientEvent::StateChanged(state) = event {
            states.push(state);
        }
    }
    states
}

/// Wait for a state change matching `want`, giving up after `limit`.
pub async fn wait_for_state(
    rx: &mut broadcast::Receiver<ClientEvent>,
    limit: Duration,
    want: impl Fn(&ConnectionState) -> bool,
) -> Option<ConnectionState> {
    tokio::time::timeout(limit, async {
        loop {
            match rx.recv().await {
                Ok(ClientEvent::StateChanged(state)) if want(&state) => return Some(state),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
    .await
    .ok()
    .flatten()
}
