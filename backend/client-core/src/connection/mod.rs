//! Connection lifecycle for a single bridge.
//!
//! # State machine
//!
//! ```text
//! Disconnected --connect--> Connecting --ok--> Connected
//!                                      \--fail--> Failed(reason)
//! Failed --connect--> Connecting     Failed --disconnect--> Disconnected
//! Connected --disconnect--> Disconnected
//! Connected --liveness lost--> Failed(LivenessLost)
//! ```
//!
//! Exactly one state is active at any instant. Every transition is checked
//! against [`ConnectionState::can_transition_to`] and published while the
//! state write-lock is held, so subscribers observe transitions in the same
//! order they happened.
//!
//! # Locking
//!
//! - `snapshot` (RwLock) holds what readers see: state, endpoint, session id
//! - `session` (Mutex) owns the transport and is held for a whole
//!   connect/disconnect, which serialises lifecycle operations

mod liveness;

use crate::config::ConnectionConfig;
use crate::error::connection::ConnectionError;
use crate::events::{ClientEvent, EVENT_CHANNEL_CAPACITY};
use crate::probe::{BridgeIdentity, BridgeProbe};

use models::{ConnectionState, Endpoint, FailureReason};

use std::sync::Arc;

use liveness::LivenessSettings;
use log::{debug, info, warn};
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Point-in-time view of the manager.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    pub state: ConnectionState,
    /// Set exactly when `state` is `Connected`.
    pub endpoint: Option<Endpoint>,
    pub session_id: Option<Uuid>,
}

pub(crate) struct Shared {
    snapshot: RwLock<ConnectionSnapshot>,
    events: broadcast::Sender<ClientEvent>,
}

impl Shared {
    /// Move to `next`, publishing the change. Illegal edges are refused.
    async fn transition(
        &self,
        next: ConnectionState,
        endpoint: Option<Endpoint>,
        session_id: Option<Uuid>,
    ) -> bool {
        let mut snapshot = self.snapshot.write().await;

        if !snapshot.state.can_transition_to(&next) {
            warn!(
                "Refusing connection transition {} -> {}",
                snapshot.state.label(),
                next.label()
            );
            return false;
        }

        info!("Connection {} -> {}", snapshot.state.label(), next);

        *snapshot = ConnectionSnapshot {
            state: next.clone(),
            endpoint,
            session_id,
        };

        // No subscribers is fine
        let _ = self.events.send(ClientEvent::StateChanged(next));
        true
    }

    /// Fail the session `session_id` with `LivenessLost`, if it is still current.
    async fn lose_session(&self, session_id: Uuid) -> bool {
        let mut snapshot = self.snapshot.write().await;

        if !snapshot.state.is_connected() || snapshot.session_id != Some(session_id) {
            debug!("Ignoring liveness loss for stale session {session_id}");
            return false;
        }

        let next = ConnectionState::Failed(FailureReason::LivenessLost);
        info!("Connection connected -> {next}");

        *snapshot = ConnectionSnapshot {
            state: next.clone(),
            endpoint: None,
            session_id: None,
        };

        let _ = self.events.send(ClientEvent::StateChanged(next));
        true
    }
}

struct Session {
    id: Uuid,
    endpoint: Endpoint,
    monitor: Option<JoinHandle<()>>,
}

impl Session {
    fn release(self) {
        if let Some(monitor) = self.monitor {
            monitor.abort();
        }
        debug!("Released session {} to {}", self.id, self.endpoint);
    }
}

pub struct ConnectionManager {
    config: ConnectionConfig,
    shared: Arc<Shared>,
    session: Mutex<Option<Session>>,
}

impl ConnectionManager {
    pub fn new(config: ConnectionConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self::with_events(config, events)
    }

    /// Manager publishing onto an existing event channel.
    pub fn with_events(config: ConnectionConfig, events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            config,
            shared: Arc::new(Shared {
                snapshot: RwLock::new(ConnectionSnapshot::default()),
                events,
            }),
            session: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.shared.events.subscribe()
    }

    pub async fn snapshot(&self) -> ConnectionSnapshot {
        self.shared.snapshot.read().await.clone()
    }

    pub async fn state(&self) -> ConnectionState {
        self.shared.snapshot.read().await.state.clone()
    }

    /// Endpoint of the live session; `None` unless `Connected`.
    pub async fn current_endpoint(&self) -> Option<Endpoint> {
        self.shared.snapshot.read().await.endpoint.clone()
    }

    /// Whether a session still holds a transport. Stays `true` after
    /// liveness loss until the next connect or disconnect releases it.
    pub async fn has_transport(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Open a session to `endpoint`.
    ///
    /// A live session is released first, passing through `Disconnected`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Handshake`] when the bridge does not answer
    /// within `handshake_timeout` or answers as something else. The manager
    /// is then `Failed` with the same reason.
    pub async fn connect(&self, endpoint: Endpoint) -> Result<BridgeIdentity, ConnectionError> {
        let mut session = self.session.lock().await;

        if let Some(previous) = session.take() {
            previous.release();
        }
        if self.shared.snapshot.read().await.state.is_connected() {
            self.shared
                .transition(ConnectionState::Disconnected, None, None)
                .await;
        }

        self.shared
            .transition(ConnectionState::Connecting, None, None)
            .await;

        match self.handshake(&endpoint).await {
            Ok((probe, identity)) => {
                let id = Uuid::new_v4();
                self.shared
                    .transition(ConnectionState::Connected, Some(endpoint.clone()), Some(id))
                    .await;

                let monitor = self.config.liveness_interval.map(|interval| {
                    let settings = LivenessSettings {
                        interval,
                        grace: self.config.liveness_grace,
                    };
                    tokio::spawn(liveness::monitor(
                        Arc::clone(&self.shared),
                        probe,
                        endpoint.clone(),
                        id,
                        settings,
                    ))
                });

                info!("Session {id} open to {endpoint}");
                *session = Some(Session {
                    id,
                    endpoint,
                    monitor,
                });
                Ok(identity)
            }
            Err(reason) => {
                warn!("Handshake with {endpoint} failed: {reason}");
                self.shared
                    .transition(ConnectionState::Failed(reason.clone()), None, None)
                    .await;
                Err(ConnectionError::handshake(endpoint, reason))
            }
        }
    }

    async fn handshake(
        &self,
        endpoint: &Endpoint,
    ) -> Result<(BridgeProbe, BridgeIdentity), FailureReason> {
        let timeout = self.config.handshake_timeout;
        let probe = BridgeProbe::new(timeout).map_err(|e| {
            warn!("Could not build transport: {e}");
            e.failure_reason()
        })?;

        match tokio::time::timeout(timeout, probe.identify(endpoint)).await {
            Ok(Ok(identity)) => Ok((probe, identity)),
            Ok(Err(e)) => {
                debug!("Handshake probe error: {e}");
                Err(e.failure_reason())
            }
            Err(_) => Err(FailureReason::Timeout),
        }
    }

    /// Release any session and settle in `Disconnected`.
    ///
    /// Returns `false`, publishing nothing, when already disconnected.
    pub async fn disconnect(&self) -> bool {
        let mut session = self.session.lock().await;

        if let Some(current) = session.take() {
            current.release();
        }

        let state = self.shared.snapshot.read().await.state.clone();
        if state == ConnectionState::Disconnected {
            debug!("Disconnect while already disconnected");
            return false;
        }

        self.shared
            .transition(ConnectionState::Disconnected, None, None)
            .await
    }
}
