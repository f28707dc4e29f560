//! Periodic health checks for an established session.

use super::Shared;
use crate::error::probe::ProbeError;
use crate::probe::BridgeProbe;

use models::Endpoint;

use std::sync::Arc;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, trace, warn};
use tokio::time::{MissedTickBehavior, interval, sleep as TokioSleep};
use uuid::Uuid;

/// Settings for one monitor task.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LivenessSettings {
    pub interval: Duration,
    pub grace: Duration,
}

/// Re-probe `endpoint` every `interval` until a check fails past the grace
/// window, then fail the session.
///
/// If the session was replaced or released meanwhile the failure is
/// discarded; the task is normally aborted before that can happen.
pub(crate) async fn monitor(
    shared: Arc<Shared>,
    probe: BridgeProbe,
    endpoint: Endpoint,
    session_id: Uuid,
    settings: LivenessSettings,
) {
    let mut ticker = interval(settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the handshake just succeeded
    ticker.tick().await;

    debug!(
        "Liveness monitor for {endpoint} started (every {})",
        humantime::format_duration(settings.interval)
    );

    loop {
        ticker.tick().await;

        if let Err(e) = check_with_retry(&probe, &endpoint, settings).await {
            warn!("Bridge at {endpoint} stopped answering: {e}");
            shared.lose_session(session_id).await;
            return;
        }

        trace!("Bridge at {endpoint} still alive");
    }
}

async fn check_with_retry(
    probe: &BridgeProbe,
    endpoint: &Endpoint,
    settings: LivenessSettings,
) -> Result<(), ProbeError> {
    let first_retry = settings.interval.min(Duration::from_millis(500));
    let mut backoff = ExponentialBackoff {
        current_interval: first_retry,
        initial_interval: first_retry,
        max_elapsed_time: Some(settings.grace),
        ..Default::default()
    };

    loop {
        let error = match probe.identify(endpoint).await {
            Ok(_) => return Ok(()),
            Err(e) => e,
        };

        if !error.is_retryable() {
            return Err(error);
        }

        match backoff.next_backoff() {
            Some(duration) => {
                debug!(
                    "Liveness probe of {endpoint} failed ({}), retrying after {duration:?}",
                    error.error_category()
                );
                TokioSleep(duration).await;
            }
            None => return Err(error),
        }
    }
}
