use crate::{Ipv4Network, ModelError};

use std::net::Ipv4Addr;

/// **VALUE**: Verifies /24 host enumeration skips network and broadcast addresses.
///
/// **WHY THIS MATTERS**: Probing .0 and .255 wastes two of the scan's concurrent slots and on
/// some routers triggers broadcast storms.
///
/// **BUG THIS CATCHES**: Would catch off-by-one bounds in `hosts()`.
#[test]
fn given_slash_24_when_hosts_enumerated_then_yields_254_addresses() {
    // GIVEN: A typical home network attachment
    let net = Ipv4Network::new(Ipv4Addr::new(192, 168, 1, 37), 24).unwrap();

    // WHEN: Enumerating hosts
    let hosts: Vec<Ipv4Addr> = net.hosts().collect();

    // THEN: .1 through .254
    assert_eq!(hosts.len(), 254);
    assert_eq!(net.host_count(), 254);
    assert_eq!(hosts.first(), Some(&Ipv4Addr::new(192, 168, 1, 1)));
    assert_eq!(hosts.last(), Some(&Ipv4Addr::new(192, 168, 1, 254)));
    assert_eq!(net.network(), Ipv4Addr::new(192, 168, 1, 0));
    assert_eq!(net.broadcast(), Ipv4Addr::new(192, 168, 1, 255));
}

#[test]
fn given_point_to_point_prefixes_when_hosts_enumerated_then_all_addresses_are_hosts() {
    let p31 = Ipv4Network::new(Ipv4Addr::new(10, 0, 0, 1), 31).unwrap();
    assert_eq!(
        p31.hosts().collect::<Vec<_>>(),
        vec![Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(10, 0, 0, 1)]
    );

    let p32 = Ipv4Network::new(Ipv4Addr::new(10, 0, 0, 9), 32).unwrap();
    assert_eq!(p32.hosts().collect::<Vec<_>>(), vec![Ipv4Addr::new(10, 0, 0, 9)]);
}

/// **VALUE**: Verifies that wide networks are narrowed around our own address.
///
/// **WHY THIS MATTERS**: A /16 corporate Wi-Fi would otherwise mean 65k probes and a scan that
/// can never finish inside its time budget.
///
/// **BUG THIS CATCHES**: Would catch narrowing around the wrong block (e.g. 10.1.0.0/24
/// instead of the block that contains the device).
#[test]
fn given_wide_network_when_narrowed_then_keeps_block_containing_own_address() {
    let wide = Ipv4Network::new(Ipv4Addr::new(10, 1, 42, 7), 16).unwrap();

    let narrowed = wide.narrowed(24);

    assert_eq!(narrowed.prefix(), 24);
    assert_eq!(narrowed.network(), Ipv4Addr::new(10, 1, 42, 0));
    assert_eq!(narrowed.broadcast(), Ipv4Addr::new(10, 1, 42, 255));

    let already_narrow = Ipv4Network::new(Ipv4Addr::new(10, 1, 42, 7), 28).unwrap();
    assert_eq!(already_narrow.narrowed(24), already_narrow);
}

#[test]
fn given_prefix_over_32_when_created_then_returns_validation_error() {
    let result = Ipv4Network::new(Ipv4Addr::new(10, 0, 0, 1), 33);
    assert!(matches!(result, Err(ModelError::Validation { .. })));
}

#[test]
fn given_network_when_displayed_then_uses_cidr_notation() {
    let net = Ipv4Network::new(Ipv4Addr::new(172, 16, 5, 4), 20).unwrap();
    assert_eq!(net.to_string(), "172.16.5.4/20");
    assert_eq!(net.network(), Ipv4Addr::new(172, 16, 0, 0));
}
