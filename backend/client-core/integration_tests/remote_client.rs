use crate::helpers::{
    HEALTH_PATH, bridge_reply, closed_port, drain_states, endpoint_of, fast_config,
    loopback_interfaces, mock_bridge, slow_bridge, wait_for_state,
};

use client_core::RemoteClient;
use client_core::config::ClientConfig;
use client_core::discovery::ScanStatus;
use client_core::error::ClientError;
use client_core::events::ClientEvent;
use client_core::remote_client::ConnectionForm;
use client_core::storage::ConnectionStore;

use models::{ConnectionState, Endpoint, FailureReason};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

fn client(config: ClientConfig) -> RemoteClient {
    RemoteClient::with_interfaces(config, loopback_interfaces()).unwrap()
}

fn scanning_config(data_dir: &Path, port: u16) -> ClientConfig {
    let mut config = fast_config(data_dir);
    config.discovery.port = port;
    config
}

fn port_text(server: &MockServer) -> String {
    server.address().port().to_string()
}

// ----------------------------------------------------------------------------
// construction
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies a saved connection is shown at startup without connecting to it.
///
/// **WHY THIS MATTERS**: Auto-connecting on launch would hang the first screen whenever the
/// PC is off. The saved address is a convenience for the form, nothing more.
///
/// **BUG THIS CATCHES**: Would catch startup reporting `Connected` from disk alone, or the
/// saved record not reaching the form.
#[tokio::test]
async fn given_saved_connection_when_started_then_prefills_but_stays_disconnected() {
    // GIVEN: A record from an earlier session
    let dir = TempDir::new().unwrap();
    ConnectionStore::new(dir.path())
        .save(&Endpoint::new("10.0.0.5", 5000).unwrap())
        .unwrap();

    // WHEN: Starting the client
    let client = client(fast_config(dir.path()));

    // THEN: Disconnected, with the record pre-filled
    assert_eq!(client.state().await, ConnectionState::Disconnected);
    assert_eq!(client.current_endpoint().await, None);
    assert_eq!(
        client.saved_connection().await,
        Some(Endpoint::new("10.0.0.5", 5000).unwrap())
    );
    assert_eq!(client.status_text().await, "Last connected: 10.0.0.5");
    assert_eq!(
        client.connection_form().await,
        ConnectionForm {
            host: String::from("10.0.0.5"),
            port: String::from("5000"),
        }
    );
}

#[tokio::test]
async fn given_no_saved_connection_when_started_then_asks_for_address() {
    let dir = TempDir::new().unwrap();

    let client = client(fast_config(dir.path()));

    assert_eq!(client.saved_connection().await, None);
    assert_eq!(client.status_text().await, "Enter PC IP address");
    assert_eq!(client.connection_form().await, ConnectionForm::blank(5000));
}

#[tokio::test]
async fn given_corrupt_record_when_started_then_treated_as_never_connected() {
    let dir = TempDir::new().unwrap();
    let store = ConnectionStore::new(dir.path());
    std::fs::write(store.path(), "{\"last_connection\": 42}").unwrap();

    let client = client(fast_config(dir.path()));

    assert_eq!(client.saved_connection().await, None);
    assert_eq!(client.status_text().await, "Enter PC IP address");
}

// ----------------------------------------------------------------------------
// connect()
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies the full happy path: normalise, connect, persist, report.
///
/// **WHY THIS MATTERS**: Users paste addresses like `http://192.168.1.10/` from browser bars.
/// The connect that follows must persist so the next launch pre-fills it.
///
/// **BUG THIS CATCHES**: Would catch normalisation being skipped before the handshake, or
/// the record being written before the handshake succeeded.
#[tokio::test]
async fn given_pasted_url_when_connected_then_normalises_persists_and_reports() {
    // GIVEN: A bridge and a scheme-and-slash decorated address
    let bridge = mock_bridge("OFFICE-PC").await;
    let dir = TempDir::new().unwrap();
    let client = client(fast_config(dir.path()));

    // WHEN: Connecting
    let endpoint = client
        .connect("  http://127.0.0.1/  ", &port_text(&bridge))
        .await
        .unwrap();

    // THEN: Connected to the bare endpoint, saved to disk
    assert_eq!(endpoint, endpoint_of(&bridge));
    assert!(client.is_connected().await);
    assert_eq!(client.current_endpoint().await, Some(endpoint.clone()));
    assert_eq!(client.saved_connection().await, Some(endpoint.clone()));
    assert_eq!(ConnectionStore::new(dir.path()).load().unwrap(), Some(endpoint.clone()));
    assert_eq!(client.status_text().await, format!("Connected to {endpoint}"));
}

/// **VALUE**: Verifies an empty host fails locally with no state change.
///
/// **WHY THIS MATTERS**: An accidental tap on Connect with a blank field must not flash
/// "Connecting..." or touch the network.
///
/// **BUG THIS CATCHES**: Would catch validation running after the `Connecting` transition.
#[tokio::test]
async fn given_blank_host_when_connected_then_invalid_input_without_transition() {
    let dir = TempDir::new().unwrap();
    let client = client(fast_config(dir.path()));
    let mut rx = client.subscribe();

    let result = client.connect("   ", "5000").await;

    assert!(matches!(result, Err(ClientError::InvalidInput { .. })));
    assert_eq!(client.state().await, ConnectionState::Disconnected);
    assert!(drain_states(&mut rx).is_empty());
}

#[tokio::test]
async fn given_unparsable_port_when_connected_then_uses_default_port() {
    // GIVEN: The only bridge listens on the configured default port
    let bridge = mock_bridge("OFFICE-PC").await;
    let dir = TempDir::new().unwrap();
    let mut config = fast_config(dir.path());
    config.connection.default_port = bridge.address().port();
    let client = client(config);

    // WHEN: The port field holds garbage
    let endpoint = client.connect("127.0.0.1", "50OO").await.unwrap();

    // THEN: The default port was substituted
    assert_eq!(endpoint.port(), bridge.address().port());
}

#[tokio::test]
async fn given_unreachable_bridge_when_connected_then_reports_failure_and_keeps_record() {
    let dir = TempDir::new().unwrap();
    let saved = Endpoint::new("10.0.0.5", 5000).unwrap();
    ConnectionStore::new(dir.path()).save(&saved).unwrap();
    let client = client(fast_config(dir.path()));

    let result = client.connect("127.0.0.1", &closed_port().to_string()).await;

    assert!(matches!(
        result,
        Err(ClientError::Connect {
            reason: FailureReason::Refused,
            ..
        })
    ));
    assert_eq!(client.state().await, ConnectionState::Failed(FailureReason::Refused));
    assert!(client.status_text().await.starts_with("Connection failed: "));
    assert_eq!(ConnectionStore::new(dir.path()).load().unwrap(), Some(saved));
}

/// **VALUE**: Verifies a second connect during a handshake is rejected without a second probe.
///
/// **WHY THIS MATTERS**: Double-tapping Connect would otherwise race two handshakes, and
/// whichever lost would leave the state machine contradicting the saved record.
///
/// **BUG THIS CATCHES**: Would catch the gate being taken after normalisation or the
/// rejected call reaching the transport (the mock expects exactly one request).
#[tokio::test]
async fn given_connect_in_flight_when_connected_again_then_rejected_busy() {
    // GIVEN: A slow bridge that must see exactly one handshake
    let bridge = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(HEALTH_PATH))
        .respond_with(bridge_reply("OFFICE-PC").set_delay(Duration::from_millis(500)))
        .expect(1)
        .mount(&bridge)
        .await;
    let dir = TempDir::new().unwrap();
    let client = Arc::new(client(fast_config(dir.path())));
    let port = port_text(&bridge);

    let first = {
        let client = Arc::clone(&client);
        let port = port.clone();
        tokio::spawn(async move { client.connect("127.0.0.1", &port).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    // WHEN: Connecting again mid-handshake
    let second = client.connect("127.0.0.1", &port).await;

    // THEN: Busy now, the first still succeeds
    assert!(second.unwrap_err().is_busy());
    assert!(first.await.unwrap().is_ok());
    assert!(client.is_connected().await);
}

/// **VALUE**: A disconnect issued mid-handshake leaves the facade and the state machine
/// agreeing that nothing is connected.
///
/// **WHY THIS MATTERS**: The status line is what the user reads. Claiming a live session
/// the manager has already released sends them into the app with no transport.
///
/// **BUG THIS CATCHES**: Would catch `connect` saving and reporting "Connected to ..."
/// after a concurrent `disconnect` had already settled the manager in `Disconnected`.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_connect_in_flight_when_disconnected_then_status_matches_state() {
    // GIVEN: A connect stuck in a slow handshake
    let bridge = slow_bridge("OFFICE-PC", Duration::from_millis(200)).await;
    let dir = TempDir::new().unwrap();
    let client = Arc::new(client(fast_config(dir.path())));
    let port = port_text(&bridge);

    let connecting = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.connect("127.0.0.1", &port).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    // WHEN: Disconnecting before the handshake completes
    let disconnected = client.disconnect().await;
    let connected = connecting.await.unwrap();

    // THEN: The connect settled first, then the disconnect released it
    assert!(connected.is_ok());
    assert!(disconnected);
    assert_eq!(client.state().await, ConnectionState::Disconnected);
    assert_eq!(client.current_endpoint().await, None);
    assert_eq!(client.status_text().await, "Disconnected");
}

#[tokio::test]
async fn given_unwritable_store_when_connected_then_stays_connected() {
    // GIVEN: A data directory that can never be created
    let bridge = mock_bridge("OFFICE-PC").await;
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "").unwrap();
    let client = client(fast_config(&blocker.join("data")));

    // WHEN: Connecting
    let result = client.connect("127.0.0.1", &port_text(&bridge)).await;

    // THEN: The session is live even though nothing was saved
    assert!(result.is_ok());
    assert_eq!(client.state().await, ConnectionState::Connected);
    assert_eq!(client.saved_connection().await, None);
    assert!(client.status_text().await.ends_with("(not saved)"));
}

#[tokio::test]
async fn given_second_bridge_when_connected_then_record_overwritten() {
    let first = mock_bridge("FIRST").await;
    let second = mock_bridge("SECOND").await;
    let dir = TempDir::new().unwrap();
    let client = client(fast_config(dir.path()));

    client.connect("127.0.0.1", &port_text(&first)).await.unwrap();
    client.connect("127.0.0.1", &port_text(&second)).await.unwrap();

    assert_eq!(
        ConnectionStore::new(dir.path()).load().unwrap(),
        Some(endpoint_of(&second))
    );
    assert_eq!(client.current_endpoint().await, Some(endpoint_of(&second)));
}

// ----------------------------------------------------------------------------
// disconnect(), continue_to_app(), select_server()
// ----------------------------------------------------------------------------

#[tokio::test]
async fn given_connected_when_disconnected_twice_then_idempotent() {
    let bridge = mock_bridge("OFFICE-PC").await;
    let dir = TempDir::new().unwrap();
    let client = client(fast_config(dir.path()));
    client.connect("127.0.0.1", &port_text(&bridge)).await.unwrap();

    assert!(client.disconnect().await);
    assert!(!client.disconnect().await);

    assert_eq!(client.state().await, ConnectionState::Disconnected);
    assert_eq!(client.status_text().await, "Disconnected");
    assert!(client.saved_connection().await.is_some(), "Disconnect keeps the record");
}

#[tokio::test]
async fn given_disconnected_when_continuing_then_not_connected() {
    let dir = TempDir::new().unwrap();
    let client = client(fast_config(dir.path()));

    let result = client.continue_to_app().await;

    assert!(matches!(result, Err(ClientError::NotConnected { .. })));
    assert_eq!(client.status_text().await, "Please connect to the PC first.");
}

#[tokio::test]
async fn given_connected_when_continuing_then_returns_endpoint() {
    let bridge = mock_bridge("OFFICE-PC").await;
    let dir = TempDir::new().unwrap();
    let client = client(fast_config(dir.path()));
    let endpoint = client.connect("127.0.0.1", &port_text(&bridge)).await.unwrap();

    assert_eq!(client.continue_to_app().await.unwrap(), endpoint);
}

#[tokio::test]
async fn given_discovered_address_when_selected_then_prefills_without_connecting() {
    let dir = TempDir::new().unwrap();
    let client = client(fast_config(dir.path()));
    let mut rx = client.subscribe();

    let endpoint = client.select_server("192.168.1.20").await.unwrap();

    assert_eq!(endpoint, Endpoint::new("192.168.1.20", 5000).unwrap());
    assert_eq!(client.status_text().await, "Selected 192.168.1.20");
    assert_eq!(client.connection_form().await.host, "192.168.1.20");
    assert_eq!(client.state().await, ConnectionState::Disconnected);
    assert!(drain_states(&mut rx).is_empty());
}

#[tokio::test]
async fn given_saved_record_when_forgotten_then_form_cleared() {
    let dir = TempDir::new().unwrap();
    ConnectionStore::new(dir.path())
        .save(&Endpoint::new("10.0.0.5", 5000).unwrap())
        .unwrap();
    let client = client(fast_config(dir.path()));

    assert!(client.forget_saved().await.unwrap());

    assert_eq!(client.saved_connection().await, None);
    assert_eq!(ConnectionStore::new(dir.path()).load().unwrap(), None);
    assert_eq!(client.connection_form().await, ConnectionForm::blank(5000));
}

// ----------------------------------------------------------------------------
// scan()
// ----------------------------------------------------------------------------

#[tokio::test]
async fn given_bridge_on_subnet_when_scanned_then_list_and_status_updated() {
    let bridge = mock_bridge("OFFICE-PC").await;
    let dir = TempDir::new().unwrap();
    let client = client(scanning_config(dir.path(), bridge.address().port()));
    let mut rx = client.subscribe();

    let report = client.scan().await;

    assert_eq!(report.status, ScanStatus::Completed);
    assert_eq!(client.discovered_servers().await, report.servers);
    assert_eq!(client.status_text().await, "Found 1 server(s)");

    let mut saw_started = false;
    let mut finished = None;
    while let Ok(event) = rx.try_recv() {
        match event {
            ClientEvent::ScanStarted => saw_started = true,
            ClientEvent::ScanFinished(report) => finished = Some(report),
            _ => {}
        }
    }
    assert!(saw_started);
    assert_eq!(finished.map(|r| r.servers.len()), Some(1));
}

#[tokio::test]
async fn given_no_attachment_when_scanned_then_reports_no_network() {
    let dir = TempDir::new().unwrap();
    let client = RemoteClient::with_interfaces(
        fast_config(dir.path()),
        Box::new(client_core::discovery::StaticInterfaces::default()),
    )
    .unwrap();

    let report = client.scan().await;

    assert_eq!(report.status, ScanStatus::NoNetworkAttachment);
    assert_eq!(client.status_text().await, "No network connection");
}

/// **VALUE**: Verifies a new scan cancels the previous one and only the newer one wins.
///
/// **WHY THIS MATTERS**: Tapping Scan twice must not let a stale, slower scan overwrite the
/// list the newer scan produced.
///
/// **BUG THIS CATCHES**: Would catch the first scan running to completion, or its results
/// replacing the shared list after the second scan started.
#[tokio::test]
async fn given_running_scan_when_scanned_again_then_first_is_cancelled() {
    // GIVEN: A scan stuck on a slow candidate
    let bridge = slow_bridge("SLOW-PC", Duration::from_secs(5)).await;
    let dir = TempDir::new().unwrap();
    let mut config = scanning_config(dir.path(), bridge.address().port());
    config.discovery.timeout = Duration::from_millis(800);
    config.discovery.probe_timeout = Duration::from_secs(4);
    let client = Arc::new(client(config));
    let first = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.scan().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    // WHEN: A second scan starts
    let second = client.scan().await;
    let first = first.await.unwrap();

    // THEN: The first was cancelled, the second ran to its budget
    assert_eq!(first.status, ScanStatus::Cancelled);
    assert_eq!(second.status, ScanStatus::TimedOut);
    assert_eq!(client.status_text().await, "No servers found");
}

#[tokio::test]
async fn given_running_scan_when_cancel_requested_then_reports_cancelled() {
    let bridge = slow_bridge("SLOW-PC", Duration::from_secs(5)).await;
    let dir = TempDir::new().unwrap();
    let mut config = scanning_config(dir.path(), bridge.address().port());
    config.discovery.timeout = Duration::from_secs(5);
    config.discovery.probe_timeout = Duration::from_secs(4);
    let client = Arc::new(client(config));
    let scan = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.scan().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(client.cancel_scan());
    let report = scan.await.unwrap();

    assert_eq!(report.status, ScanStatus::Cancelled);
    assert_eq!(client.status_text().await, "Scan cancelled");
    assert!(!client.cancel_scan(), "Nothing left to cancel");
}

// ----------------------------------------------------------------------------
// liveness
// ----------------------------------------------------------------------------

#[tokio::test]
async fn given_live_session_when_bridge_lost_then_status_reports_failure() {
    // GIVEN: A connected client with a fast liveness monitor
    let bridge = mock_bridge("OFFICE-PC").await;
    let dir = TempDir::new().unwrap();
    let mut config = fast_config(dir.path());
    config.connection.liveness_interval = Some(Duration::from_millis(100));
    config.connection.liveness_grace = Duration::from_millis(300);
    let client = client(config);
    client.connect("127.0.0.1", &port_text(&bridge)).await.unwrap();
    let mut rx = client.subscribe();

    // WHEN: The bridge stops answering
    bridge.reset().await;
    let lost = wait_for_state(&mut rx, Duration::from_secs(5), |s| s.is_failed()).await;

    // THEN: State and status both say so, and navigation is gated again
    assert_eq!(lost, Some(ConnectionState::Failed(FailureReason::LivenessLost)));
    assert_eq!(
        client.status_text().await,
        format!("Connection failed: {}", FailureReason::LivenessLost)
    );
    assert!(client.continue_to_app().await.is_err());
}
