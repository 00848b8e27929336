// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    parse_config(path, &contents)
}

/// Like [`load_config`], but a file that does not exist yields the built-in
/// defaults. Any other read error is returned.
pub async fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => parse_config(path, &contents),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("Config file {} not found, using defaults", path.display());
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
        Err(e) => Err(e)
            .with_context(|| format!("Failed to read config file {}", path.display())),
    }
}

fn parse_config(path: &Path, contents: &str) -> Result<Config> {
    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?
        }
        _ => serde_json::from_str(contents).context("Failed to parse JSON config")?,
    };

    config.validate()?;
    Ok(config)
}
