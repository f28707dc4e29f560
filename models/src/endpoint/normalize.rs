//! Normalisation of raw host and port text typed by a user or read off a
//! discovery result.

use crate::error::model_error::ModelError;

use std::net::IpAddr;
use std::sync::OnceLock;

use log::{debug, warn};
use regex::Regex;

const SCHEME_PREFIXES: [&str; 2] = ["http://", "https://"];
const MAX_HOSTNAME_LEN: usize = 253;
const HOSTNAME_PATTERN: &str =
    r"^(?i)[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)*$";

static HOSTNAME_REGEX: OnceLock<Regex> = OnceLock::new();

pub(crate) fn get_hostname_regex() -> &'static Regex {
    HOSTNAME_REGEX.get_or_init(|| Regex::new(HOSTNAME_PATTERN).expect("valid regex pattern"))
}

/// Host text after scheme, path and bracket removal, plus any port that was
/// written inline (`host:port` or `[v6]:port`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HostParts {
    pub host: String,
    pub inline_port: Option<String>,
}

/// Strip a leading `http://` / `https://` (any case).
pub(crate) fn strip_scheme(raw: &str) -> &str {
    for scheme in SCHEME_PREFIXES {
        if let Some(prefix) = raw.get(..scheme.len())
            && prefix.eq_ignore_ascii_case(scheme)
        {
            return &raw[scheme.len()..];
        }
    }
    raw
}

/// Split raw host text into its host and inline-port components.
///
/// Everything from the first `/` onwards is treated as a path and dropped,
/// which also covers trailing separators.
pub(crate) fn split_host(raw_host: &str) -> HostParts {
    let trimmed = raw_host.trim();
    let without_scheme = strip_scheme(trimmed);
    let authority = match without_scheme.find('/') {
        Some(idx) => {
            if idx + 1 < without_scheme.trim_end_matches('/').len() {
                debug!("Dropping path from host input: {without_scheme}");
            }
            &without_scheme[..idx]
        }
        None => without_scheme,
    };

    // Bracketed IPv6, optionally followed by :port
    if let Some(rest) = authority.strip_prefix('[')
        && let Some(end) = rest.find(']')
    {
        let host = rest[..end].to_string();
        let inline_port = rest[end + 1..].strip_prefix(':').map(|p| p.to_string());
        return HostParts { host, inline_port };
    }

    // A bare IPv6 literal has several colons; only a single colon is a port
    if authority.matches(':').count() == 1
        && let Some((host, port)) = authority.split_once(':')
    {
        return HostParts {
            host: host.to_string(),
            inline_port: Some(port.to_string()),
        };
    }

    HostParts {
        host: authority.to_string(),
        inline_port: None,
    }
}

/// Check that `host` is an IP literal or an RFC 1123 hostname.
#[track_caller]
pub(crate) fn validate_host(host: &str) -> Result<(), ModelError> {
    if host.is_empty() {
        return Err(ModelError::invalid_input("Host cannot be empty"));
    }

    if host.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    if host.len() > MAX_HOSTNAME_LEN || !get_hostname_regex().is_match(host) {
        return Err(ModelError::invalid_input(format!("Invalid host: {host}")));
    }

    Ok(())
}

/// Parse port text, returning `None` for anything outside `1..=65535`.
pub(crate) fn parse_port(raw_port: &str) -> Option<u16> {
    match raw_port.trim().parse::<u16>() {
        Ok(0) | Err(_) => None,
        Ok(port) => Some(port),
    }
}

/// Resolve the port to use: explicit text, then inline port, then default.
pub(crate) fn resolve_port(raw_port: &str, inline_port: Option<&str>, default_port: u16) -> u16 {
    if let Some(port) = parse_port(raw_port) {
        return port;
    }

    if let Some(port) = inline_port.and_then(parse_port) {
        debug!("Using port {port} written inline with the host");
        return port;
    }

    if !raw_port.trim().is_empty() {
        warn!("Port '{raw_port}' is not a valid port, falling back to {default_port}");
    }
    default_port
}
