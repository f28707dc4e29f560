use crate::ErrorLocation;

use std::panic::Location;

#[track_caller]
fn capture() -> ErrorLocation {
    ErrorLocation::from(Location::caller())
}

/// **VALUE**: Verifies that `ErrorLocation` reports the caller of a `#[track_caller]` helper.
///
/// **WHY THIS MATTERS**: Every error constructor in the workspace relies on this to point at
/// the line that failed instead of the constructor itself.
///
/// **BUG THIS CATCHES**: Would catch if `#[track_caller]` propagation breaks or if the
/// line/column capture is wired to the wrong `Location` accessor.
#[test]
fn given_track_caller_helper_when_location_captured_then_points_at_call_site() {
    // GIVEN / WHEN: Capturing through a #[track_caller] helper
    let (location, expected_line) = (capture(), line!());

    // THEN: File, line and column belong to this test
    assert!(location.file.contains("error_location.rs"));
    assert_eq!(location.line, expected_line);
    assert!(location.column > 0);
}

/// **VALUE**: Verifies the bracketed `[file:line:column]` Display format.
///
/// **WHY THIS MATTERS**: Every error message ends with this suffix; log readers grep for it.
///
/// **BUG THIS CATCHES**: Would catch a format change that drops the brackets or a component.
#[test]
fn given_error_location_when_displayed_then_uses_bracketed_format() {
    // GIVEN: A fixed location
    let location = ErrorLocation {
        file: "src/discovery/scan.rs",
        line: 42,
        column: 7,
    };

    // WHEN: Formatting
    let rendered = location.to_string();

    // THEN: Matches the bracketed format
    assert_eq!(rendered, "[src/discovery/scan.rs:42:7]");
}

/// **VALUE**: Verifies that `file_name()` strips directories on both separator styles.
///
/// **WHY THIS MATTERS**: Status lines in the CLI show the short name only.
///
/// **BUG THIS CATCHES**: Would catch Windows paths leaking their full directory prefix.
#[test]
fn given_nested_paths_when_file_name_called_then_returns_last_component() {
    let unix = ErrorLocation {
        file: "backend/client-core/src/probe/mod.rs",
        line: 1,
        column: 1,
    };
    let windows = ErrorLocation {
        file: "backend\\client-core\\src\\storage\\mod.rs",
        line: 1,
        column: 1,
    };
    let bare = ErrorLocation {
        file: "lib.rs",
        line: 1,
        column: 1,
    };

    assert_eq!(unix.file_name(), "mod.rs");
    assert_eq!(windows.file_name(), "mod.rs");
    assert_eq!(bare.file_name(), "lib.rs");
}
