use crate::endpoint::{get_hostname_regex, parse_port, split_host, strip_scheme};
use crate::{Endpoint, ModelError};

const DEFAULT_PORT: u16 = 5000;

/// **VALUE**: Verifies the canonical normalisation case: scheme and trailing slash removed.
///
/// **WHY THIS MATTERS**: Users paste addresses copied from a browser. If the scheme or slash
/// survives, the handshake URL becomes `http://http://...` and every connect fails.
///
/// **BUG THIS CATCHES**: Would catch if scheme stripping or path dropping is removed.
#[test]
fn given_http_prefixed_host_with_slash_when_parsed_then_normalizes_to_bare_ip() {
    // GIVEN: A browser-style address and valid port text
    let raw_host = "http://192.168.1.10/";
    let raw_port = "5000";

    // WHEN: Parsing
    let endpoint = Endpoint::parse(raw_host, raw_port, DEFAULT_PORT).unwrap();

    // THEN: Host is the bare IP and port is kept
    assert_eq!(endpoint, Endpoint::new("192.168.1.10", 5000).unwrap());
}

/// **VALUE**: Verifies that unparsable port text falls back to the default port.
///
/// **WHY THIS MATTERS**: The connect screen never rejects a request because of port text;
/// the default bridge port is used instead.
///
/// **BUG THIS CATCHES**: Would catch if port parsing starts returning an error instead.
#[test]
fn given_garbage_port_when_parsed_then_substitutes_default_port() {
    for raw_port in ["abc", "", "  ", "0", "70000", "-1", "50 00"] {
        let endpoint = Endpoint::parse("10.0.0.5", raw_port, DEFAULT_PORT).unwrap();
        assert_eq!(endpoint.port(), DEFAULT_PORT, "port text: {raw_port:?}");
    }
}

/// **VALUE**: Verifies that whitespace around the port text is tolerated.
///
/// **BUG THIS CATCHES**: Would catch a regression where " 8080 " silently becomes 5000.
#[test]
fn given_padded_port_when_parsed_then_keeps_explicit_port() {
    let endpoint = Endpoint::parse(" bridge.local ", " 8080 ", DEFAULT_PORT).unwrap();
    assert_eq!(endpoint.host(), "bridge.local");
    assert_eq!(endpoint.port(), 8080);
}

/// **VALUE**: Verifies that an empty host after normalisation is rejected as invalid input.
///
/// **WHY THIS MATTERS**: This is the fail-fast path: no network attempt may follow.
///
/// **BUG THIS CATCHES**: Would catch if `"https:///"` slipped through as an empty host.
#[test]
fn given_host_that_normalizes_to_empty_when_parsed_then_returns_invalid_input() {
    for raw_host in ["", "   ", "http://", "https:///", "/"] {
        let result = Endpoint::parse(raw_host, "5000", DEFAULT_PORT);
        assert!(
            matches!(result, Err(ModelError::InvalidInput { .. })),
            "host {raw_host:?} should be rejected"
        );
    }
}

/// **VALUE**: Verifies that malformed hostnames are rejected.
///
/// **BUG THIS CATCHES**: Would catch if the hostname regex stops anchoring and accepts spaces
/// or underscores.
#[test]
fn given_malformed_host_when_parsed_then_returns_invalid_input() {
    for raw_host in ["my host", "bad_host", "-leading.dash", "trailing-.example", "a..b"] {
        let result = Endpoint::parse(raw_host, "5000", DEFAULT_PORT);
        assert!(
            matches!(result, Err(ModelError::InvalidInput { .. })),
            "host {raw_host:?} should be rejected"
        );
    }
}

#[test]
fn given_mixed_case_scheme_when_stripped_then_removed() {
    assert_eq!(strip_scheme("HTTPS://Bridge"), "Bridge");
    assert_eq!(strip_scheme("Http://10.0.0.1"), "10.0.0.1");
    assert_eq!(strip_scheme("ftp://10.0.0.1"), "ftp://10.0.0.1");
    assert_eq!(strip_scheme("é"), "é");
}

/// **VALUE**: Verifies inline `host:port` handling and the explicit-port precedence.
///
/// **WHY THIS MATTERS**: Discovery results are rendered as `host:port`; selecting one must
/// round-trip into the same endpoint.
///
/// **BUG THIS CATCHES**: Would catch if an inline port overrode explicitly typed port text.
#[test]
fn given_inline_port_when_parsed_then_explicit_text_wins_then_inline_then_default() {
    let inline_only = Endpoint::parse("192.168.1.20:5050", "", DEFAULT_PORT).unwrap();
    assert_eq!(inline_only.port(), 5050);

    let explicit = Endpoint::parse("192.168.1.20:5050", "6000", DEFAULT_PORT).unwrap();
    assert_eq!(explicit.port(), 6000);

    let bad_inline = Endpoint::parse("192.168.1.20:nope", "", DEFAULT_PORT).unwrap();
    assert_eq!(bad_inline.port(), DEFAULT_PORT);
    assert_eq!(bad_inline.host(), "192.168.1.20");
}

/// **VALUE**: Verifies IPv6 literals in bare and bracketed form.
///
/// **BUG THIS CATCHES**: Would catch if the single-colon port split chopped up bare IPv6
/// literals, or if brackets leaked into the stored host.
#[test]
fn given_ipv6_literals_when_parsed_then_brackets_stripped_and_display_rebrackets() {
    let bare = Endpoint::parse("fe80::1", "5000", DEFAULT_PORT).unwrap();
    assert_eq!(bare.host(), "fe80::1");
    assert!(bare.is_ipv6());

    let bracketed = Endpoint::parse("http://[fe80::1]:7000/", "", DEFAULT_PORT).unwrap();
    assert_eq!(bracketed.host(), "fe80::1");
    assert_eq!(bracketed.port(), 7000);
    assert_eq!(bracketed.to_string(), "[fe80::1]:7000");
    assert_eq!(bracketed.base_url(), "http://[fe80::1]:7000");
}

#[test]
fn given_path_after_host_when_split_then_path_dropped() {
    let parts = split_host("https://bridge.lan/api/health");
    assert_eq!(parts.host, "bridge.lan");
    assert_eq!(parts.inline_port, None);
}

#[test]
fn given_port_text_when_parsed_then_only_1_to_65535_accepted() {
    assert_eq!(parse_port("1"), Some(1));
    assert_eq!(parse_port("65535"), Some(65535));
    assert_eq!(parse_port("0"), None);
    assert_eq!(parse_port("65536"), None);
}

#[test]
fn given_hostname_regex_when_matching_labels_then_enforces_label_rules() {
    let re = get_hostname_regex();
    assert!(re.is_match("desktop-7"));
    assert!(re.is_match("My-PC.local"));
    assert!(!re.is_match(&"a".repeat(64)));
    assert!(re.is_match(&"a".repeat(63)));
}

/// **VALUE**: Verifies that deserialisation validates like construction does.
///
/// **WHY THIS MATTERS**: A hand-edited persistence file with port 0 must not produce an
/// endpoint that the connection manager then tries to dial.
///
/// **BUG THIS CATCHES**: Would catch if `#[serde(try_from)]` is removed from `Endpoint`.
#[test]
fn given_invalid_record_json_when_deserialized_then_fails() {
    let ok: Endpoint = serde_json::from_str(r#"{"host":"10.0.0.5","port":5000}"#).unwrap();
    assert_eq!(ok, Endpoint::new("10.0.0.5", 5000).unwrap());

    let zero_port = serde_json::from_str::<Endpoint>(r#"{"host":"10.0.0.5","port":0}"#);
    assert!(zero_port.is_err());

    let empty_host = serde_json::from_str::<Endpoint>(r#"{"host":"","port":5000}"#);
    assert!(empty_host.is_err());
}

#[test]
fn given_endpoint_when_serialized_then_uses_host_port_shape() {
    let endpoint = Endpoint::new("10.0.0.5", 5000).unwrap();
    let json = serde_json::to_value(&endpoint).unwrap();
    assert_eq!(json, serde_json::json!({"host": "10.0.0.5", "port": 5000}));
}

#[test]
fn given_invalid_input_error_when_formatted_then_includes_location() {
    let err = Endpoint::parse("", "5000", DEFAULT_PORT).unwrap_err();
    assert_eq!(err.message(), "Host cannot be empty");
    let rendered = err.to_string();
    assert!(rendered.contains("Invalid Input"));
    assert!(rendered.contains("endpoint.rs"), "location should point at the caller: {rendered}");
}
