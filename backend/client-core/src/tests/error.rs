use crate::error::ClientError;
use crate::error::connection::ConnectionError;
use crate::error::probe::ProbeError;

use common::HttpStatusCode;
use models::{Endpoint, FailureReason, ModelError};

/// **VALUE**: Verifies every client error renders a status line without locations or
/// transport internals.
///
/// **WHY THIS MATTERS**: Status text is shown verbatim to end users. A `[probe.rs:88:14]`
/// suffix or a hyper error chain there is both confusing and leaks implementation detail.
///
/// **BUG THIS CATCHES**: Would catch `status_text()` falling back to `to_string()`.
#[test]
fn given_client_errors_when_status_text_rendered_then_has_no_location() {
    let errors = [
        ClientError::busy(),
        ClientError::not_connected(),
        ClientError::from(ModelError::invalid_input("Host cannot be empty")),
        ClientError::from(ConnectionError::handshake(
            Endpoint::new("10.0.0.5", 5000).unwrap(),
            FailureReason::Refused,
        )),
    ];

    for error in &errors {
        let text = error.status_text();
        assert!(!text.contains(".rs:"), "Status text leaked a location: {text}");
        assert!(error.to_string().contains(".rs:"), "Display should carry the location");
    }

    assert_eq!(errors[1].status_text(), "Please connect to the PC first.");
    assert!(errors[3].status_text().starts_with("Connection failed: "));
}

#[test]
fn given_handshake_error_when_converted_then_keeps_failure_reason() {
    let error = ConnectionError::handshake(
        Endpoint::new("10.0.0.5", 5000).unwrap(),
        FailureReason::Timeout,
    );

    let client_error = ClientError::from(error);

    assert!(matches!(
        client_error,
        ClientError::Connect {
            reason: FailureReason::Timeout,
            ..
        }
    ));
}

#[test]
fn given_probe_errors_when_mapped_then_produce_matching_failure_reasons() {
    assert_eq!(
        ProbeError::timeout("http://10.0.0.5:5000/api/health").failure_reason(),
        FailureReason::Timeout
    );

    let unrecognized = ProbeError::unrecognized(
        "http://10.0.0.5:5000/api/health",
        "HTTP 404",
        Some(HttpStatusCode(404)),
    );
    assert_eq!(
        unrecognized.failure_reason(),
        FailureReason::Unrecognized(String::from("HTTP 404"))
    );
    assert_eq!(unrecognized.error_category(), "unrecognized");
}

/// **VALUE**: Verifies which probe failures the liveness monitor retries.
///
/// **WHY THIS MATTERS**: A single dropped Wi-Fi packet should not end a session, but a
/// bridge that was swapped for another service will never come back and should fail fast.
///
/// **BUG THIS CATCHES**: Would catch treating every error as retryable (slow failure) or
/// none as retryable (flapping sessions).
#[test]
fn given_probe_errors_when_checked_then_only_transient_ones_are_retryable() {
    assert!(ProbeError::timeout("u").is_retryable());
    assert!(ProbeError::unrecognized("u", "HTTP 503", Some(HttpStatusCode(503))).is_retryable());
    assert!(!ProbeError::unrecognized("u", "HTTP 404", Some(HttpStatusCode(404))).is_retryable());
    assert!(!ProbeError::unrecognized("u", "service 'x'", None).is_retryable());
}

#[test]
fn given_invalid_url_when_converted_then_becomes_invalid_url_error() {
    let parse_error = url::Url::parse("http://").unwrap_err();

    let error = ProbeError::from(parse_error);

    assert!(matches!(error, ProbeError::InvalidUrl { .. }));
    assert!(!error.is_retryable());
}
