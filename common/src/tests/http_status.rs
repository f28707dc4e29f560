use crate::HttpStatusCode;

/// **VALUE**: Verifies the range helpers used to classify health replies.
///
/// **WHY THIS MATTERS**: The probe treats 2xx as a candidate bridge and everything else as
/// some other service, and the liveness monitor keeps retrying on transient codes.
///
/// **BUG THIS CATCHES**: Would catch off-by-one range bounds (e.g. 300 counted as success).
#[test]
fn given_status_codes_when_classified_then_ranges_are_exclusive() {
    assert!(HttpStatusCode(200).is_success());
    assert!(HttpStatusCode(299).is_success());
    assert!(!HttpStatusCode(300).is_success());

    assert!(HttpStatusCode(404).is_client_error());
    assert!(!HttpStatusCode(500).is_client_error());

    assert!(HttpStatusCode(503).is_server_error());
    assert!(HttpStatusCode(503).is_transient());
    assert!(HttpStatusCode(429).is_transient());
    assert!(!HttpStatusCode(500).is_transient());
}

#[test]
fn given_u16_when_converted_then_displays_number() {
    let status: HttpStatusCode = 418.into();
    assert_eq!(status.to_string(), "418");
}
