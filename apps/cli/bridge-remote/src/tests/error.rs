use crate::error::AppError;

use client_core::error::ClientError;

#[test]
fn given_client_error_when_converted_then_user_message_is_status_text() {
    let error = AppError::from(ClientError::not_connected());

    assert_eq!(error.user_message(), "Please connect to the PC first.");
    assert!(matches!(error, AppError::Core { .. }));
}

/// **VALUE**: Verifies the log form keeps both the core location and the conversion site.
///
/// **WHY THIS MATTERS**: The terminal only shows the status line, so the log line is the
/// only way to tell where a failure came from.
///
/// **BUG THIS CATCHES**: Would catch the core error's `Display` being dropped during
/// conversion.
#[test]
fn given_client_error_when_displayed_then_includes_core_detail() {
    let error = AppError::from(ClientError::busy());

    let text = error.to_string();

    assert!(text.starts_with("Core Error: Connect already in progress"));
    assert!(text.contains("error.rs:"));
}

#[test]
fn given_app_error_when_displayed_then_has_location() {
    let error = AppError::app("Failed to create log directory: denied");

    assert_eq!(error.user_message(), "Failed to create log directory: denied");
    assert!(error.to_string().contains("error.rs:"));
}
