use crate::probe::BridgeProbe;

use models::Endpoint;

use std::time::Duration;

#[test]
fn given_ipv4_endpoint_when_health_url_built_then_targets_health_route() {
    let endpoint = Endpoint::new("192.168.1.10", 5000).unwrap();

    let url = BridgeProbe::health_url(&endpoint).unwrap();

    assert_eq!(url.as_str(), "http://192.168.1.10:5000/api/health");
}

/// **VALUE**: Verifies IPv6 endpoints produce a bracketed, parseable URL.
///
/// **WHY THIS MATTERS**: An unbracketed `http://fe80::1:5000` is not a valid URL, so every
/// IPv6 connect would fail before a single packet was sent.
///
/// **BUG THIS CATCHES**: Would catch `base_url()` formatting the raw host instead of the
/// bracketed `Display` form.
#[test]
fn given_ipv6_endpoint_when_health_url_built_then_host_is_bracketed() {
    let endpoint = Endpoint::parse("[fd00::20]", "5000", 5000).unwrap();

    let url = BridgeProbe::health_url(&endpoint).unwrap();

    assert_eq!(url.as_str(), "http://[fd00::20]:5000/api/health");
}

#[test]
fn given_hostname_endpoint_when_health_url_built_then_lowercases_host() {
    let endpoint = Endpoint::new("Office-PC.local", 5050).unwrap();

    let url = BridgeProbe::health_url(&endpoint).unwrap();

    assert_eq!(url.host_str(), Some("office-pc.local"));
    assert_eq!(url.port(), Some(5050));
    assert_eq!(url.path(), "/api/health");
}

#[test]
fn given_timeout_when_probe_built_then_reports_it() {
    let probe = BridgeProbe::new(Duration::from_millis(250)).unwrap();

    assert_eq!(probe.timeout(), Duration::from_millis(250));
}
