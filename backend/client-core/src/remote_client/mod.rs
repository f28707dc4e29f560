//! Facade the presentation layer drives.
//!
//! [`RemoteClient`] ties the connection manager, discovery engine and
//! persistence store together and keeps the small amount of view state a
//! front end needs: the status line, the last scan's servers, the saved
//! connection and the connect-form pre-fill.
//!
//! # Policies
//!
//! - a `connect` issued while another is in flight fails with
//!   [`ClientError::Busy`] without touching the network
//! - a new `scan` cancels the one before it; the superseded scan still
//!   returns its partial results, tagged `Cancelled`, but no longer updates
//!   the shared server list or status
//! - a failed save after a successful connect is logged and shown in the
//!   status line; the session stays `Connected`
//! - `disconnect` waits for an in-flight `connect` to finish its bookkeeping,
//!   so the status line never claims a session the manager has released

mod form;

pub use form::ConnectionForm;

use crate::config::ClientConfig;
use crate::connection::ConnectionManager;
use crate::discovery::{
    DiscoveryEngine, InterfaceSource, ScanCanceller, ScanReport, SystemInterfaces,
};
use crate::error::ClientError;
use crate::events::{ClientEvent, EVENT_CHANNEL_CAPACITY};
use crate::storage::ConnectionStore;

use models::{ConnectionState, DiscoveredServer, Endpoint};

use std::sync::Mutex as StdMutex;

use log::{debug, info, warn};
use tokio::sync::{Mutex, RwLock, broadcast};

#[derive(Debug)]
struct ViewState {
    saved: Option<Endpoint>,
    status: String,
    servers: Vec<DiscoveredServer>,
    form: ConnectionForm,
    /// `status` describes the session that is (or was) live.
    status_tracks_session: bool,
}

pub struct RemoteClient {
    config: ClientConfig,
    connection: ConnectionManager,
    discovery: DiscoveryEngine,
    store: ConnectionStore,
    events: broadcast::Sender<ClientEvent>,
    connect_gate: Mutex<()>,
    /// Held across a connect or disconnect, including the view updates.
    lifecycle: Mutex<()>,
    active_scan: StdMutex<Option<ScanCanceller>>,
    view: RwLock<ViewState>,
}

impl RemoteClient {
    /// Build a client scanning the operating system's interfaces.
    ///
    /// Reads the saved connection from disk; performs no network I/O.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_interfaces(config, Box::new(SystemInterfaces))
    }

    pub fn with_interfaces(
        config: ClientConfig,
        interfaces: Box<dyn InterfaceSource>,
    ) -> Result<Self, ClientError> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let connection = ConnectionManager::with_events(config.connection.clone(), events.clone());
        let discovery = DiscoveryEngine::with_interfaces(config.discovery.clone(), interfaces)?;
        let store = ConnectionStore::new(config.data_dir());

        let saved = match store.load() {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Ignoring unreadable saved connection: {e}");
                None
            }
        };

        let (status, form) = match &saved {
            Some(endpoint) => {
                info!("Last connection was {endpoint}");
                (
                    format!("Last connected: {}", endpoint.host()),
                    ConnectionForm::from_endpoint(endpoint),
                )
            }
            None => (
                String::from("Enter PC IP address"),
                ConnectionForm::blank(config.connection.default_port),
            ),
        };

        Ok(Self {
            config,
            connection,
            discovery,
            store,
            events,
            connect_gate: Mutex::new(()),
            lifecycle: Mutex::new(()),
            active_scan: StdMutex::new(None),
            view: RwLock::new(ViewState {
                saved,
                status,
                servers: Vec::new(),
                form,
                status_tracks_session: false,
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &ConnectionStore {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn state(&self) -> ConnectionState {
        self.connection.state().await
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.state().await.is_connected()
    }

    pub async fn current_endpoint(&self) -> Option<Endpoint> {
        self.connection.current_endpoint().await
    }

    pub async fn saved_connection(&self) -> Option<Endpoint> {
        self.view.read().await.saved.clone()
    }

    pub async fn connection_form(&self) -> ConnectionForm {
        self.view.read().await.form.clone()
    }

    /// Current status line.
    ///
    /// A session lost after connecting reports the failure even though no
    /// facade call has run since.
    pub async fn status_text(&self) -> String {
        let state = self.connection.state().await;
        let view = self.view.read().await;

        match state.failure() {
            Some(reason) if view.status_tracks_session => format!("Connection failed: {reason}"),
            _ => view.status.clone(),
        }
    }

    /// Servers from the most recent scan that was not superseded.
    pub async fn discovered_servers(&self) -> Vec<DiscoveredServer> {
        self.view.read().await.servers.clone()
    }

    async fn set_status(&self, status: impl Into<String>) {
        let status = status.into();
        let mut view = self.view.write().await;
        debug!("Status: {status}");
        view.status = status.clone();
        view.status_tracks_session = false;
        let _ = self.events.send(ClientEvent::Status(status));
    }

    /// Normalise the typed address and connect to it.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Busy`] if another connect is in flight
    /// - [`ClientError::InvalidInput`] if the host is empty or malformed
    /// - [`ClientError::Connect`] if the handshake failed
    pub async fn connect(&self, raw_host: &str, raw_port: &str) -> Result<Endpoint, ClientError> {
        let Ok(_gate) = self.connect_gate.try_lock() else {
            debug!("Rejecting connect to '{raw_host}': another connect is in flight");
            return Err(ClientError::busy());
        };
        let _lifecycle = self.lifecycle.lock().await;

        let endpoint =
            match Endpoint::parse(raw_host, raw_port, self.config.connection.default_port) {
                Ok(endpoint) => endpoint,
                Err(e) => {
                    let error = ClientError::from(e);
                    self.set_status(error.status_text()).await;
                    return Err(error);
                }
            };

        self.view.write().await.form = ConnectionForm::from_endpoint(&endpoint);
        self.set_status("Connecting...").await;

        if let Err(e) = self.connection.connect(endpoint.clone()).await {
            let error = ClientError::from(e);
            self.set_status(error.status_text()).await;
            return Err(error);
        }

        match self.store.save(&endpoint) {
            Ok(()) => {
                self.view.write().await.saved = Some(endpoint.clone());
                self.set_status(format!("Connected to {endpoint}")).await;
            }
            Err(e) => {
                warn!("Connected to {endpoint} but could not save it: {e}");
                self.set_status(format!("Connected to {endpoint} (not saved)"))
                    .await;
            }
        }
        self.view.write().await.status_tracks_session = true;

        Ok(endpoint)
    }

    /// Release the session. Returns `false`, publishing nothing, when there
    /// was nothing to disconnect.
    pub async fn disconnect(&self) -> bool {
        let _lifecycle = self.lifecycle.lock().await;
        let changed = self.connection.disconnect().await;
        if changed {
            self.set_status("Disconnected").await;
        }
        changed
    }

    /// Scan the LAN for bridges, cancelling any scan still running.
    pub async fn scan(&self) -> ScanReport {
        let canceller = ScanCanceller::new();
        let previous = self
            .active_scan
            .lock()
            .ok()
            .and_then(|mut active| active.replace(canceller.clone()));
        if let Some(previous) = previous {
            info!("Cancelling previous scan");
            previous.cancel();
        }

        self.view.write().await.servers.clear();
        let _ = self.events.send(ClientEvent::ScanStarted);
        self.set_status("Scanning network...").await;

        let report = self.discovery.scan(&canceller).await;

        let still_current = self.active_scan.lock().is_ok_and(|mut active| {
            let current = active.as_ref().is_some_and(|c| c.same_scan(&canceller));
            if current {
                *active = None;
            }
            current
        });

        if !still_current {
            debug!("Scan superseded, discarding its {} server(s)", report.servers.len());
            return report;
        }

        self.view.write().await.servers = report.servers.clone();
        self.set_status(report.status_text()).await;
        let _ = self.events.send(ClientEvent::ScanFinished(report.clone()));
        report
    }

    /// Cancel the running scan, if any.
    pub fn cancel_scan(&self) -> bool {
        match self.active_scan.lock() {
            Ok(active) => match active.as_ref() {
                Some(canceller) => {
                    canceller.cancel();
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }

    /// Pre-fill the connect form from a discovered server's address.
    ///
    /// A port written in `address` is kept; otherwise the default port is used.
    pub async fn select_server(&self, address: &str) -> Result<Endpoint, ClientError> {
        let endpoint = Endpoint::parse(address, "", self.config.connection.default_port)?;

        self.view.write().await.form = ConnectionForm::from_endpoint(&endpoint);
        self.set_status(format!("Selected {}", endpoint.host())).await;
        Ok(endpoint)
    }

    /// Gate navigation past the connect screen.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] unless a session is live.
    pub async fn continue_to_app(&self) -> Result<Endpoint, ClientError> {
        match self.connection.current_endpoint().await {
            Some(endpoint) => Ok(endpoint),
            None => {
                let error = ClientError::not_connected();
                self.set_status(error.status_text()).await;
                Err(error)
            }
        }
    }

    /// Delete the saved connection.
    pub async fn forget_saved(&self) -> Result<bool, ClientError> {
        let removed = self.store.clear()?;
        let mut view = self.view.write().await;
        view.saved = None;
        view.form = ConnectionForm::blank(self.config.connection.default_port);
        Ok(removed)
    }
}
