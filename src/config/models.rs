// src/config/models.rs
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_UPSTREAM_URL: &str = "https://fakestoreapi.com/products";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    /// Path the products relay is served on.
    pub mount_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            mount_path: "/products".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub url: Url,
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_UPSTREAM_URL).expect("default upstream URL is valid"),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9090,
            path: "/metrics".to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        match self.upstream.url.scheme() {
            "http" | "https" => {}
            other => bail!("Unsupported upstream URL scheme: {}", other),
        }

        if self.upstream.timeout_secs == 0 {
            bail!("upstream.timeout_secs must be greater than zero");
        }

        if !self.server.mount_path.starts_with('/') {
            bail!("server.mount_path must start with '/': {}", self.server.mount_path);
        }

        if self.metrics.enabled {
            if !self.metrics.path.starts_with('/') {
                bail!("metrics.path must start with '/': {}", self.metrics.path);
            }
            if self.metrics.port == self.server.bind_address.port() {
                bail!(
                    "metrics.port {} collides with the server port",
                    self.metrics.port
                );
            }
        }

        Ok(())
    }
}
