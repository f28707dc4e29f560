//! Bridge endpoint: a validated host and port pair.

mod normalize;

#[cfg(test)]
pub(crate) use normalize::{get_hostname_regex, parse_port, split_host, strip_scheme};

use crate::error::model_error::ModelError;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Address of a bridge server.
///
/// Immutable once constructed. Construction always goes through validation,
/// including deserialisation, so an `Endpoint` in hand is known to be usable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "EndpointRecord")]
pub struct Endpoint {
    host: String,
    port: u16,
}

/// Unvalidated on-disk / on-wire shape of an [`Endpoint`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Build from an already-normalised host and port.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInput`] for an empty or malformed host and
    /// [`ModelError::Validation`] for port `0`.
    #[track_caller]
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, ModelError> {
        let host = host.into();
        normalize::validate_host(&host)?;

        if port == 0 {
            return Err(ModelError::validation("Port must be in 1-65535"));
        }

        Ok(Self { host, port })
    }

    /// Normalise raw user text into an endpoint.
    ///
    /// - trims whitespace and strips an `http://` / `https://` prefix
    /// - drops any path, including trailing `/`
    /// - strips IPv6 brackets
    /// - parses `raw_port`; if that fails, uses a port written inline with the
    ///   host, and failing that `default_port`
    ///
    /// An unparsable port never rejects the request.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInput`] when the normalised host is empty
    /// or is not a hostname / IP literal.
    #[track_caller]
    pub fn parse(raw_host: &str, raw_port: &str, default_port: u16) -> Result<Self, ModelError> {
        let parts = normalize::split_host(raw_host);
        let port = normalize::resolve_port(raw_port, parts.inline_port.as_deref(), default_port);
        Self::new(parts.host, port)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_ipv6(&self) -> bool {
        matches!(self.host.parse::<IpAddr>(), Ok(IpAddr::V6(_)))
    }

    /// `http://host:port`, bracketing IPv6 literals.
    pub fn base_url(&self) -> String {
        format!("http://{self}")
    }

    pub fn to_record(&self) -> EndpointRecord {
        EndpointRecord {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

impl TryFrom<EndpointRecord> for Endpoint {
    type Error = ModelError;

    #[track_caller]
    fn try_from(record: EndpointRecord) -> Result<Self, Self::Error> {
        Endpoint::new(record.host, record.port)
    }
}

impl Display for Endpoint {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        if self.is_ipv6() {
            write!(formatter, "[{}]:{}", self.host, self.port)
        } else {
            write!(formatter, "{}:{}", self.host, self.port)
        }
    }
}
