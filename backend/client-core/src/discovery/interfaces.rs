//! Local IPv4 attachments that define which subnets a scan covers.

use models::Ipv4Network;

use std::net::{IpAddr, Ipv4Addr};

use log::{debug, trace};
use sysinfo::Networks;

/// Supplies the device's current IPv4 network attachments.
pub trait InterfaceSource: Send + Sync {
    fn ipv4_networks(&self) -> Vec<Ipv4Network>;
}

/// Reads attachments from the operating system.
///
/// Loopback, link-local, multicast and unspecified addresses are skipped;
/// none of them can reach a bridge on the LAN.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInterfaces;

pub(crate) fn is_scannable(addr: Ipv4Addr) -> bool {
    !(addr.is_loopback()
        || addr.is_link_local()
        || addr.is_unspecified()
        || addr.is_multicast()
        || addr.is_broadcast())
}

impl InterfaceSource for SystemInterfaces {
    fn ipv4_networks(&self) -> Vec<Ipv4Network> {
        let networks = Networks::new_with_refreshed_list();
        let mut found = Vec::new();

        for (name, data) in networks.list() {
            for ip in data.ip_networks() {
                let IpAddr::V4(addr) = ip.addr else {
                    continue;
                };

                if !is_scannable(addr) {
                    trace!("Skipping {addr}/{} on {name}", ip.prefix);
                    continue;
                }

                match Ipv4Network::new(addr, ip.prefix) {
                    Ok(network) => {
                        debug!("Interface {name} attached to {network}");
                        found.push(network);
                    }
                    Err(e) => debug!("Ignoring interface {name}: {e}"),
                }
            }
        }

        found
    }
}

/// Fixed list of attachments, for embedding hosts that already know their
/// network and for tests.
#[derive(Debug, Default, Clone)]
pub struct StaticInterfaces {
    networks: Vec<Ipv4Network>,
}

impl StaticInterfaces {
    pub fn new(networks: Vec<Ipv4Network>) -> Self {
        Self { networks }
    }
}

impl InterfaceSource for StaticInterfaces {
    fn ipv4_networks(&self) -> Vec<Ipv4Network> {
        self.networks.clone()
    }
}
