//! IPv4 network attachment arithmetic used to enumerate scan candidates.

use crate::error::model_error::ModelError;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::net::Ipv4Addr;

/// One IPv4 address of this device together with its prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Network {
    addr: Ipv4Addr,
    prefix: u8,
}

impl Ipv4Network {
    #[track_caller]
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, ModelError> {
        if prefix > 32 {
            return Err(ModelError::validation(format!(
                "Invalid IPv4 prefix length: {prefix} (must be 0-32)"
            )));
        }
        Ok(Self { addr, prefix })
    }

    /// The device's own address on this network.
    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn mask(&self) -> u32 {
        if self.prefix == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(self.prefix))
        }
    }

    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) & self.mask())
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) | !self.mask())
    }

    /// Narrow a wide network to the `/min_prefix` block around our address.
    ///
    /// Networks already at least that narrow are returned unchanged.
    pub fn narrowed(&self, min_prefix: u8) -> Self {
        let min_prefix = min_prefix.min(32);
        if self.prefix >= min_prefix {
            *self
        } else {
            Self {
                addr: self.addr,
                prefix: min_prefix,
            }
        }
    }

    /// Number of addresses [`hosts`](Self::hosts) yields.
    pub fn host_count(&self) -> u64 {
        match self.prefix {
            32 => 1,
            31 => 2,
            p => (1u64 << (32 - u32::from(p))) - 2,
        }
    }

    /// Usable host addresses, in ascending order.
    ///
    /// Network and broadcast addresses are skipped except on /31 and /32,
    /// where every address is a host.
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let network = u32::from(self.network());
        let broadcast = u32::from(self.broadcast());
        let (first, last) = match self.prefix {
            31 | 32 => (network, broadcast),
            _ => (network + 1, broadcast - 1),
        };
        (first..=last).map(Ipv4Addr::from)
    }
}

impl Display for Ipv4Network {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}/{}", self.addr, self.prefix)
    }
}
