use crate::{ConnectionState, FailureReason};

/// **VALUE**: Verifies the lifecycle edge table.
///
/// **WHY THIS MATTERS**: The connection manager refuses any transition this table rejects, so
/// a missing edge would wedge the manager and an extra edge would let observers see
/// impossible sequences such as `Disconnected -> Connected`.
///
/// **BUG THIS CATCHES**: Would catch accidental additions such as skipping `Connecting`.
#[test]
fn given_lifecycle_states_when_checking_edges_then_only_documented_edges_allowed() {
    let failed = ConnectionState::Failed(FailureReason::Timeout);

    // Allowed
    assert!(ConnectionState::Disconnected.can_transition_to(&ConnectionState::Connecting));
    assert!(ConnectionState::Connecting.can_transition_to(&ConnectionState::Connected));
    assert!(ConnectionState::Connecting.can_transition_to(&failed));
    assert!(failed.can_transition_to(&ConnectionState::Connecting));
    assert!(failed.can_transition_to(&ConnectionState::Disconnected));
    assert!(ConnectionState::Connected.can_transition_to(&ConnectionState::Disconnected));
    assert!(
        ConnectionState::Connected
            .can_transition_to(&ConnectionState::Failed(FailureReason::LivenessLost))
    );

    // Rejected
    assert!(!ConnectionState::Disconnected.can_transition_to(&ConnectionState::Connected));
    assert!(!ConnectionState::Disconnected.can_transition_to(&ConnectionState::Disconnected));
    assert!(!ConnectionState::Connected.can_transition_to(&ConnectionState::Connecting));
    assert!(!ConnectionState::Connecting.can_transition_to(&ConnectionState::Disconnected));
}

#[test]
fn given_default_state_when_created_then_disconnected() {
    let state = ConnectionState::default();
    assert_eq!(state, ConnectionState::Disconnected);
    assert!(!state.is_connected());
    assert_eq!(state.label(), "disconnected");
}

/// **VALUE**: Verifies failure text is human readable and embeds the detail.
///
/// **WHY THIS MATTERS**: The UI shows this text directly in its status line.
///
/// **BUG THIS CATCHES**: Would catch Debug formatting (`Unrecognized("...")`) reaching users.
#[test]
fn given_failed_state_when_displayed_then_renders_reason_text() {
    let state = ConnectionState::Failed(FailureReason::Unrecognized("HTTP 404".to_string()));
    let text = state.to_string();

    assert!(text.starts_with("Failed: "));
    assert!(text.contains("not a scraper bridge"));
    assert!(text.contains("HTTP 404"));
    assert!(!text.contains("Unrecognized"));
    assert_eq!(
        state.failure(),
        Some(&FailureReason::Unrecognized("HTTP 404".to_string()))
    );
}
