use super::{ScanCanceller, ScanReport, ScanStatus};
use crate::config::DiscoveryConfig;
use crate::probe::BridgeProbe;

use models::{DiscoveredServer, Endpoint, Ipv4Network};

use std::collections::HashSet;
use std::net::Ipv4Addr;

use futures_util::StreamExt;
use futures_util::stream;
use log::{debug, trace};

/// Hosts of every network, in order, deduplicated, with our own addresses left out.
pub(crate) fn candidate_hosts(networks: &[Ipv4Network], min_prefix: u8) -> Vec<Ipv4Addr> {
    let own: HashSet<Ipv4Addr> = networks.iter().map(Ipv4Network::addr).collect();
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for network in networks {
        let scanned = network.narrowed(min_prefix);
        if scanned.prefix() != network.prefix() {
            debug!("Narrowing {network} to {scanned}");
        }

        for host in scanned.hosts() {
            if !own.contains(&host) && seen.insert(host) {
                candidates.push(host);
            }
        }
    }

    candidates
}

async fn probe_one(probe: &BridgeProbe, host: Ipv4Addr, port: u16) -> Option<DiscoveredServer> {
    let endpoint = match Endpoint::new(host.to_string(), port) {
        Ok(endpoint) => endpoint,
        Err(e) => {
            debug!("Skipping candidate {host}: {e}");
            return None;
        }
    };

    match probe.identify(&endpoint).await {
        Ok(identity) => {
            let server = DiscoveredServer::new(endpoint);
            Some(match identity.name {
                Some(name) => server.with_label(name),
                None => server,
            })
        }
        Err(e) => {
            trace!("No bridge at {endpoint} ({})", e.error_category());
            None
        }
    }
}

pub(crate) async fn probe_candidates(
    probe: &BridgeProbe,
    config: &DiscoveryConfig,
    candidates: Vec<Ipv4Addr>,
    canceller: &ScanCanceller,
) -> ScanReport {
    let port = config.port;
    let mut probes = stream::iter(candidates)
        .map(|host| probe_one(probe, host, port))
        .buffer_unordered(config.concurrency.max(1));

    let deadline = tokio::time::sleep(config.timeout);
    tokio::pin!(deadline);
    let cancelled = canceller.cancelled();
    tokio::pin!(cancelled);

    let mut seen = HashSet::new();
    let mut servers = Vec::new();
    let mut probed = 0;

    // Dropping `probes` on exit abandons whatever is still in flight
    let status = loop {
        tokio::select! {
            biased;

            _ = &mut cancelled => break ScanStatus::Cancelled,
            _ = &mut deadline => break ScanStatus::TimedOut,
            next = probes.next() => match next {
                Some(found) => {
                    probed += 1;
                    if let Some(server) = found
                        && seen.insert(server.endpoint.clone())
                    {
                        debug!("Found bridge {}", server.display_name());
                        servers.push(server);
                    }
                }
                None => break ScanStatus::Completed,
            },
        }
    };

    ScanReport {
        servers,
        status,
        probed,
    }
}
