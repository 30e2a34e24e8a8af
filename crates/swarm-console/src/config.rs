//! Console configuration from environment, read once at startup.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Telemetry stream endpoint.
    pub ws_url: String,
    /// Command API base address.
    pub api_url: String,
    /// Credential for the map tile layer; the sync core only carries it
    /// through to the presentation layer.
    pub map_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            ws_url: env::var("SWARM_WS_URL")
                .unwrap_or_else(|_| "ws://localhost:8080/ws".to_string()),
            api_url: env::var("SWARM_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            map_token: env::var("SWARM_MAP_TOKEN").ok(),
        }
    }
}
