//! Logging for the bridge-remote command line.
//!
//! Logs go to stderr and to `bridge-remote.log`; command output owns stdout.
//! Stderr is colored only when it is a terminal.

use crate::error::AppError;

use std::io::{IsTerminal, stderr};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339;
use log::{LevelFilter, info, warn};

/// Set by the first `initialize` call.
static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

pub const LOG_FILE_NAME: &str = "bridge-remote.log";

#[cfg(debug_assertions)]
const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Level for a run, raised to `Trace` by `--verbose`.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose { LevelFilter::Trace } else { LOG_LEVEL }
}

/// Install the stderr + file logger.
///
/// Only the first call installs anything; later calls log a warning and
/// return Ok.
///
/// # Errors
///
/// Returns [`AppError::App`] if the log file cannot be created or the
/// dispatch cannot be installed.
pub fn initialize(log_dir: &Path, verbose: bool) -> Result<(), AppError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized");
        return Ok(());
    }

    let level = level_for(verbose);
    build_dispatch(log_dir, level)?
        .apply()
        .map_err(|e| AppError::app(format!("Failed to initialize logger: {e}")))?;

    info!("Logger initialized with level: {level:?}");
    Ok(())
}

/// Build, without installing, the stderr + file dispatch.
#[track_caller]
pub(crate) fn build_dispatch(log_dir: &Path, level: LevelFilter) -> Result<Dispatch, AppError> {
    let log_file = fern::log_file(log_dir.join(LOG_FILE_NAME))
        .map_err(|e| AppError::app(format!("Failed to create log file: {e}")))?;

    let colors = stderr().is_terminal().then(|| {
        ColoredLevelConfig::new()
            .debug(Blue)
            .info(Green)
            .warn(Yellow)
            .error(Red)
            .trace(Magenta)
    });

    // Terminal lines stay short; the file keeps timestamps and call sites.
    let stderr_dispatch = Dispatch::new()
        .format(move |out, message, record| match &colors {
            Some(colors) => {
                out.finish(format_args!("{:>5} {message}", colors.color(record.level())))
            }
            None => out.finish(format_args!("{:>5} {message}", record.level())),
        })
        .chain(stderr());

    let file_dispatch = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{file}:{line}]",
                date = format_rfc3339(SystemTime::now()),
                level = record.level(),
                file = record.file().unwrap_or("unknown"),
                line = record.line().unwrap_or(0),
            ))
        })
        .chain(log_file);

    Ok(Dispatch::new()
        .level(level)
        // reqwest and hyper are chatty at trace
        .level_for("hyper_util", LevelFilter::Info)
        .level_for("reqwest", LevelFilter::Info)
        .chain(stderr_dispatch)
        .chain(file_dispatch))
}
