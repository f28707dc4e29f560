use crate::helpers::{closed_port, foreign_service, loopback_interfaces, mock_bridge, slow_bridge};

use client_core::config::DiscoveryConfig;
use client_core::discovery::{DiscoveryEngine, ScanCanceller, ScanStatus, StaticInterfaces};

use models::{DiscoveredServer, Endpoint, Ipv4Network};

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn config_for_port(port: u16) -> DiscoveryConfig {
    DiscoveryConfig {
        port,
        timeout: Duration::from_secs(2),
        probe_timeout: Duration::from_millis(500),
        ..DiscoveryConfig::default()
    }
}

fn loopback_engine(config: DiscoveryConfig) -> DiscoveryEngine {
    DiscoveryEngine::with_interfaces(config, loopback_interfaces()).unwrap()
}

/// **VALUE**: Verifies a scan finds a live bridge and reports its self-declared name.
///
/// **WHY THIS MATTERS**: This is the whole point of discovery: the user taps a list entry
/// instead of typing an IP.
///
/// **BUG THIS CATCHES**: Would catch probing the wrong port, dropping the label, or the
/// scan ending before in-flight probes are collected.
#[tokio::test]
async fn given_bridge_on_subnet_when_scanned_then_reports_it_completed() {
    // GIVEN: A bridge at the only candidate address
    let bridge = mock_bridge("OFFICE-PC").await;
    let engine = loopback_engine(config_for_port(bridge.address().port()));

    // WHEN: Scanning
    let report = engine.scan(&ScanCanceller::new()).await;

    // THEN: Exactly that bridge, with its label
    let expected = DiscoveredServer::new(
        Endpoint::new("127.0.0.1", bridge.address().port()).unwrap(),
    )
    .with_label("OFFICE-PC");
    assert_eq!(report.status, ScanStatus::Completed);
    assert_eq!(report.servers, vec![expected]);
    assert_eq!(report.probed, 1);
}

#[tokio::test]
async fn given_nothing_listening_when_scanned_then_completes_with_no_servers() {
    let engine = loopback_engine(config_for_port(closed_port()));

    let report = engine.scan(&ScanCanceller::new()).await;

    assert_eq!(report.status, ScanStatus::Completed);
    assert!(report.servers.is_empty());
    assert_eq!(report.status_text(), "No servers found");
}

#[tokio::test]
async fn given_other_service_on_port_when_scanned_then_not_reported() {
    let server = foreign_service().await;
    let engine = loopback_engine(config_for_port(server.address().port()));

    let report = engine.scan(&ScanCanceller::new()).await;

    assert_eq!(report.status, ScanStatus::Completed);
    assert!(report.servers.is_empty());
}

/// **VALUE**: Verifies the bridge is reported once even when two attachments cover it.
///
/// **WHY THIS MATTERS**: Phones with Wi-Fi plus a VPN or hotspot often have overlapping
/// attachments. Duplicate list entries look like two PCs.
///
/// **BUG THIS CATCHES**: Would catch deduplication only within a single network.
#[tokio::test]
async fn given_overlapping_attachments_when_scanned_then_bridge_reported_once() {
    let bridge = mock_bridge("OFFICE-PC").await;
    let interfaces = StaticInterfaces::new(vec![
        Ipv4Network::new(Ipv4Addr::new(127, 0, 0, 2), 30).unwrap(),
        Ipv4Network::new(Ipv4Addr::new(127, 0, 0, 6), 29).unwrap(),
    ]);
    let engine = DiscoveryEngine::with_interfaces(
        config_for_port(bridge.address().port()),
        Box::new(interfaces),
    )
    .unwrap();

    let report = engine.scan(&ScanCanceller::new()).await;

    assert_eq!(report.servers.len(), 1);
    assert_eq!(report.servers[0].endpoint.host(), "127.0.0.1");
}

/// **VALUE**: Verifies the scan budget bounds the scan even when probes hang.
///
/// **WHY THIS MATTERS**: A single black-holed address must not hold the scan open for the
/// full probe timeout multiplied by the number of rounds.
///
/// **BUG THIS CATCHES**: Would catch the deadline not being raced against the probe stream.
#[tokio::test]
async fn given_hanging_candidate_when_scanned_then_times_out_on_budget() {
    let bridge = slow_bridge("SLOW-PC", Duration::from_secs(5)).await;
    let engine = loopback_engine(DiscoveryConfig {
        port: bridge.address().port(),
        timeout: Duration::from_millis(300),
        probe_timeout: Duration::from_secs(4),
        ..DiscoveryConfig::default()
    });

    let started = Instant::now();
    let report = engine.scan(&ScanCanceller::new()).await;

    assert_eq!(report.status, ScanStatus::TimedOut);
    assert!(report.servers.is_empty());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn given_running_scan_when_cancelled_then_returns_cancelled_promptly() {
    // GIVEN: A scan stuck on a slow candidate
    let bridge = slow_bridge("SLOW-PC", Duration::from_secs(5)).await;
    let engine = Arc::new(loopback_engine(DiscoveryConfig {
        port: bridge.address().port(),
        timeout: Duration::from_secs(10),
        probe_timeout: Duration::from_secs(8),
        ..DiscoveryConfig::default()
    }));
    let canceller = ScanCanceller::new();
    let scan = {
        let engine = Arc::clone(&engine);
        let canceller = canceller.clone();
        tokio::spawn(async move { engine.scan(&canceller).await })
    };

    // WHEN: Cancelling it
    tokio::time::sleep(Duration::from_millis(100)).await;
    let started = Instant::now();
    canceller.cancel();
    let report = scan.await.unwrap();

    // THEN: It stops right away, tagged Cancelled
    assert_eq!(report.status, ScanStatus::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn given_already_cancelled_when_scanned_then_probes_nothing() {
    let bridge = mock_bridge("OFFICE-PC").await;
    let engine = loopback_engine(config_for_port(bridge.address().port()));
    let canceller = ScanCanceller::new();
    canceller.cancel();

    let report = engine.scan(&canceller).await;

    assert_eq!(report.status, ScanStatus::Cancelled);
    assert_eq!(report.probed, 0);
}
