// Unit tests for logger construction
// Installation is process-global, so only one test installs a logger

use crate::logger::{LOG_FILE_NAME, build_dispatch, initialize, level_for};

use log::LevelFilter;
use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't panic or fail.
///
/// **WHY THIS MATTERS**: Tests and future embedding code may initialise logging from several
/// paths. If the second call errors or panics, startup crashes.
///
/// **BUG THIS CATCHES**: Would catch the AtomicBool guard being removed,
/// causing fern to fail when a global logger is set twice.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A writable directory
    let dir = TempDir::new().unwrap();

    // WHEN: Calling initialize twice
    let first = initialize(dir.path(), false);
    let second = initialize(dir.path(), true);

    // THEN: Both return Ok
    assert!(first.is_ok(), "First initialization should succeed");
    assert!(second.is_ok(), "Second initialization should succeed (idempotent)");
}

/// **VALUE**: Verifies an unusable log directory is reported as an error.
///
/// **WHY THIS MATTERS**: The binary falls back to running without a log file. That only
/// works if the failure comes back as an `Err` instead of a panic.
///
/// **BUG THIS CATCHES**: Would catch `fern::log_file()` being unwrapped.
#[test]
fn given_invalid_log_dir_when_dispatch_built_then_returns_app_error() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "").unwrap();

    let result = build_dispatch(&blocker.join("logs"), LevelFilter::Info);

    assert!(matches!(result, Err(crate::error::AppError::App { .. })));
}

#[test]
fn given_writable_dir_when_dispatch_built_then_creates_log_file() {
    let dir = TempDir::new().unwrap();

    let result = build_dispatch(dir.path(), LevelFilter::Info);

    assert!(result.is_ok());
    assert!(dir.path().join(LOG_FILE_NAME).exists());
}

#[test]
fn given_verbose_flag_when_level_chosen_then_trace() {
    assert_eq!(level_for(true), LevelFilter::Trace);
    assert_ne!(level_for(false), LevelFilter::Trace);
}
