use crate::helpers::{
    closed_port, drain_states, endpoint_of, foreign_service, mock_bridge, slow_bridge,
    wait_for_state,
};

use client_core::config::ConnectionConfig;
use client_core::connection::ConnectionManager;
use client_core::error::connection::ConnectionError;

use models::{ConnectionState, Endpoint, FailureReason};

use std::time::Duration;

fn fast_connection() -> ConnectionConfig {
    ConnectionConfig {
        handshake_timeout: Duration::from_millis(500),
        ..ConnectionConfig::default()
    }
}

// ----------------------------------------------------------------------------
// connect()
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies a successful handshake walks Disconnected -> Connecting -> Connected.
///
/// **WHY THIS MATTERS**: The UI binds its spinner and navigation to these events. A missing
/// `Connecting` leaves the button clickable during the handshake; a missing `Connected`
/// never navigates.
///
/// **BUG THIS CATCHES**: Would catch the endpoint being recorded before the handshake or
/// not at all.
#[tokio::test]
async fn given_running_bridge_when_connected_then_reaches_connected_with_endpoint() {
    // GIVEN: A bridge and a fresh manager
    let bridge = mock_bridge("OFFICE-PC").await;
    let manager = ConnectionManager::new(fast_connection());
    let mut rx = manager.subscribe();

    // WHEN: Connecting
    let identity = manager.connect(endpoint_of(&bridge)).await.unwrap();

    // THEN: Connected, with the bridge's identity and endpoint
    assert_eq!(identity.name.as_deref(), Some("OFFICE-PC"));
    assert_eq!(manager.state().await, ConnectionState::Connected);
    assert_eq!(manager.current_endpoint().await, Some(endpoint_of(&bridge)));
    assert!(manager.snapshot().await.session_id.is_some());
    assert_eq!(
        drain_states(&mut rx),
        vec![ConnectionState::Connecting, ConnectionState::Connected]
    );
}

#[tokio::test]
async fn given_nothing_listening_when_connected_then_fails_refused() {
    let endpoint = Endpoint::new("127.0.0.1", closed_port()).unwrap();
    let manager = ConnectionManager::new(fast_connection());

    let result = manager.connect(endpoint).await;

    assert!(matches!(
        result,
        Err(ConnectionError::Handshake {
            reason: FailureReason::Refused,
            ..
        })
    ));
    assert_eq!(manager.state().await, ConnectionState::Failed(FailureReason::Refused));
    assert_eq!(manager.current_endpoint().await, None);
}

/// **VALUE**: Verifies a bridge that accepts but never answers fails within the handshake budget.
///
/// **WHY THIS MATTERS**: A hung PC would otherwise leave the phone on "Connecting..." forever.
///
/// **BUG THIS CATCHES**: Would catch the handshake timeout not being applied, or a timeout
/// being reported as a generic transport error.
#[tokio::test]
async fn given_unresponsive_bridge_when_connected_then_fails_timeout_within_budget() {
    let bridge = slow_bridge("SLOW-PC", Duration::from_secs(5)).await;
    let manager = ConnectionManager::new(fast_connection());

    let started = std::time::Instant::now();
    let result = manager.connect(endpoint_of(&bridge)).await;

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(result.unwrap_err().reason(), &FailureReason::Timeout);
    assert_eq!(manager.state().await, ConnectionState::Failed(FailureReason::Timeout));
}

#[tokio::test]
async fn given_other_service_when_connected_then_fails_unrecognized() {
    let server = foreign_service().await;
    let manager = ConnectionManager::new(fast_connection());

    let result = manager.connect(endpoint_of(&server)).await;

    assert!(matches!(
        result.unwrap_err().reason(),
        FailureReason::Unrecognized(_)
    ));
}

/// **VALUE**: Verifies reconnecting while connected passes through Disconnected.
///
/// **WHY THIS MATTERS**: `Connected -> Connecting` is not an edge of the lifecycle. Observers
/// that validate transitions would reject the stream, and the old transport would leak.
///
/// **BUG THIS CATCHES**: Would catch the old session being kept alive, or the manager jumping
/// straight to `Connecting`.
#[tokio::test]
async fn given_connected_when_connected_again_then_transitions_through_disconnected() {
    // GIVEN: A live session
    let first = mock_bridge("FIRST").await;
    let second = mock_bridge("SECOND").await;
    let manager = ConnectionManager::new(fast_connection());
    manager.connect(endpoint_of(&first)).await.unwrap();
    let first_session = manager.snapshot().await.session_id;
    let mut rx = manager.subscribe();

    // WHEN: Connecting elsewhere
    manager.connect(endpoint_of(&second)).await.unwrap();

    // THEN: Every observed transition is a legal edge, ending on the new endpoint
    let states = drain_states(&mut rx);
    assert_eq!(
        states,
        vec![
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Connected,
        ]
    );
    assert_eq!(manager.current_endpoint().await, Some(endpoint_of(&second)));
    assert_ne!(manager.snapshot().await.session_id, first_session);
}

#[tokio::test]
async fn given_failed_when_connected_again_then_goes_straight_to_connecting() {
    let manager = ConnectionManager::new(fast_connection());
    let dead = Endpoint::new("127.0.0.1", closed_port()).unwrap();
    let _ = manager.connect(dead).await;
    let bridge = mock_bridge("OFFICE-PC").await;
    let mut rx = manager.subscribe();

    manager.connect(endpoint_of(&bridge)).await.unwrap();

    assert_eq!(
        drain_states(&mut rx),
        vec![ConnectionState::Connecting, ConnectionState::Connected]
    );
}

// ----------------------------------------------------------------------------
// disconnect()
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies disconnect is idempotent.
///
/// **WHY THIS MATTERS**: The UI calls disconnect from several places (button, app suspend,
/// screen teardown). Repeating it must not error or emit duplicate events.
///
/// **BUG THIS CATCHES**: Would catch a second `Disconnected` event, or an illegal
/// `Disconnected -> Disconnected` transition being attempted.
#[tokio::test]
async fn given_connected_when_disconnected_twice_then_second_call_is_noop() {
    // GIVEN: A live session
    let bridge = mock_bridge("OFFICE-PC").await;
    let manager = ConnectionManager::new(fast_connection());
    manager.connect(endpoint_of(&bridge)).await.unwrap();
    let mut rx = manager.subscribe();

    // WHEN: Disconnecting twice
    let first = manager.disconnect().await;
    let second = manager.disconnect().await;

    // THEN: One transition, transport released
    assert!(first);
    assert!(!second);
    assert_eq!(drain_states(&mut rx), vec![ConnectionState::Disconnected]);
    assert_eq!(manager.state().await, ConnectionState::Disconnected);
    assert_eq!(manager.current_endpoint().await, None);
    assert!(!manager.has_transport().await);
}

#[tokio::test]
async fn given_failed_when_disconnected_then_settles_disconnected() {
    let manager = ConnectionManager::new(fast_connection());
    let _ = manager
        .connect(Endpoint::new("127.0.0.1", closed_port()).unwrap())
        .await;

    assert!(manager.disconnect().await);
    assert_eq!(manager.state().await, ConnectionState::Disconnected);
}

#[tokio::test]
async fn given_fresh_manager_when_disconnected_then_nothing_happens() {
    let manager = ConnectionManager::new(fast_connection());
    let mut rx = manager.subscribe();

    assert!(!manager.disconnect().await);
    assert!(drain_states(&mut rx).is_empty());
}

// ----------------------------------------------------------------------------
// liveness
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies a bridge that disappears moves the session to Failed(LivenessLost).
///
/// **WHY THIS MATTERS**: Without liveness the phone keeps showing "Connected" after the PC
/// sleeps, and every later request fails with no explanation.
///
/// **BUG THIS CATCHES**: Would catch the monitor never being spawned, never giving up, or
/// failing the session without publishing the transition.
#[tokio::test]
async fn given_liveness_enabled_when_bridge_goes_away_then_fails_liveness_lost() {
    // GIVEN: A session with a fast liveness monitor
    let bridge = mock_bridge("OFFICE-PC").await;
    let manager = ConnectionManager::new(ConnectionConfig {
        handshake_timeout: Duration::from_millis(500),
        liveness_interval: Some(Duration::from_millis(100)),
        liveness_grace: Duration::from_millis(300),
        ..ConnectionConfig::default()
    });
    manager.connect(endpoint_of(&bridge)).await.unwrap();
    let mut rx = manager.subscribe();

    // WHEN: The bridge stops answering
    bridge.reset().await;

    // THEN: The monitor declares the session lost
    let lost = wait_for_state(&mut rx, Duration::from_secs(5), |s| s.is_failed()).await;
    assert_eq!(lost, Some(ConnectionState::Failed(FailureReason::LivenessLost)));
    assert_eq!(manager.current_endpoint().await, None);
}

#[tokio::test]
async fn given_liveness_enabled_when_disconnected_then_monitor_stops() {
    let bridge = mock_bridge("OFFICE-PC").await;
    let manager = ConnectionManager::new(ConnectionConfig {
        liveness_interval: Some(Duration::from_millis(50)),
        liveness_grace: Duration::from_millis(100),
        ..ConnectionConfig::default()
    });
    manager.connect(endpoint_of(&bridge)).await.unwrap();
    manager.disconnect().await;
    let mut rx = manager.subscribe();

    bridge.reset().await;
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(drain_states(&mut rx).is_empty());
    assert_eq!(manager.state().await, ConnectionState::Disconnected);
}
