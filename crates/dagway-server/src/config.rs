use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Upper bound on ranges per request; more is rejected as a bad
    /// request before any resolution work happens.
    pub max_ranges: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8150".parse().unwrap(),
            max_ranges: 64,
        }
    }
}

impl ServerConfig {
    /// Parse a config from TOML text; absent keys keep their defaults.
    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }
}
