use models::Endpoint;

/// Host and port text the presentation layer pre-fills its connect form with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionForm {
    pub host: String,
    pub port: String,
}

impl ConnectionForm {
    pub fn blank(default_port: u16) -> Self {
        Self {
            host: String::new(),
            port: default_port.to_string(),
        }
    }

    pub fn from_endpoint(endpoint: &Endpoint) -> Self {
        Self {
            host: endpoint.host().to_string(),
            port: endpoint.port().to_string(),
        }
    }
}
