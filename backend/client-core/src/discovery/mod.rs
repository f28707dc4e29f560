//! LAN discovery of bridge servers.
//!
//! A scan enumerates every host address on the device's IPv4 attachments,
//! probes each one on the bridge port with bounded concurrency, and reports
//! the bridges that answered. The whole scan is bounded by
//! [`DiscoveryConfig::timeout`] and can be cancelled at any point through a
//! [`ScanCanceller`]; either way the servers found so far are returned.

pub mod cancel;
pub mod interfaces;
mod scan;

pub use cancel::ScanCanceller;
pub use interfaces::{InterfaceSource, StaticInterfaces, SystemInterfaces};

use crate::config::DiscoveryConfig;
use crate::error::probe::ProbeError;
use crate::probe::BridgeProbe;

use models::DiscoveredServer;

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};

/// How a scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// Every candidate was probed.
    Completed,
    /// The scan budget ran out before every candidate answered.
    TimedOut,
    /// Cancelled by the caller or superseded by a newer scan.
    Cancelled,
    /// The device has no usable IPv4 attachment, so nothing was probed.
    NoNetworkAttachment,
}

/// Result of one scan. Servers are unique by endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub servers: Vec<DiscoveredServer>,
    pub status: ScanStatus,
    /// Candidates whose probe finished, successfully or not.
    pub probed: usize,
}

impl ScanReport {
    pub fn no_network() -> Self {
        Self {
            servers: Vec::new(),
            status: ScanStatus::NoNetworkAttachment,
            probed: 0,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == ScanStatus::Cancelled
    }

    /// Status line describing this outcome.
    pub fn status_text(&self) -> String {
        match self.status {
            ScanStatus::NoNetworkAttachment => String::from("No network connection"),
            ScanStatus::Cancelled => String::from("Scan cancelled"),
            ScanStatus::Completed | ScanStatus::TimedOut if self.servers.is_empty() => {
                String::from("No servers found")
            }
            ScanStatus::Completed | ScanStatus::TimedOut => {
                format!("Found {} server(s)", self.servers.len())
            }
        }
    }
}

pub struct DiscoveryEngine {
    config: DiscoveryConfig,
    probe: BridgeProbe,
    interfaces: Arc<dyn InterfaceSource>,
}

impl DiscoveryEngine {
    /// Engine scanning the operating system's interfaces.
    pub fn new(config: DiscoveryConfig) -> Result<Self, ProbeError> {
        Self::with_interfaces(config, Box::new(SystemInterfaces))
    }

    pub fn with_interfaces(
        config: DiscoveryConfig,
        interfaces: Box<dyn InterfaceSource>,
    ) -> Result<Self, ProbeError> {
        let probe = BridgeProbe::new(config.probe_timeout)?;
        Ok(Self {
            config,
            probe,
            interfaces: Arc::from(interfaces),
        })
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Addresses the next scan would probe, or `None` without any attachment.
    ///
    /// Interfaces are read on the blocking pool.
    pub async fn candidates(&self) -> Option<Vec<Ipv4Addr>> {
        let interfaces = Arc::clone(&self.interfaces);
        let networks = match tokio::task::spawn_blocking(move || interfaces.ipv4_networks()).await
        {
            Ok(networks) => networks,
            Err(e) => {
                warn!("Reading network interfaces failed: {e}");
                Vec::new()
            }
        };
        if networks.is_empty() {
            return None;
        }
        Some(scan::candidate_hosts(&networks, self.config.min_prefix))
    }

    /// Run one scan to completion, timeout or cancellation.
    ///
    /// Never fails: individual probe failures just mean "not a bridge".
    pub async fn scan(&self, canceller: &ScanCanceller) -> ScanReport {
        let Some(candidates) = self.candidates().await else {
            warn!("Discovery skipped: no IPv4 network attachment");
            return ScanReport::no_network();
        };

        info!(
            "Scanning {} candidate(s) on port {} (timeout {})",
            candidates.len(),
            self.config.port,
            humantime::format_duration(self.config.timeout)
        );

        let started = Instant::now();
        let report = scan::probe_candidates(&self.probe, &self.config, candidates, canceller).await;

        info!(
            "Scan finished {:?} after {}ms: {} server(s), {} probed",
            report.status,
            started.elapsed().as_millis(),
            report.servers.len(),
            report.probed
        );

        report
    }
}
