use crate::error::{EtlError, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub sink: SinkConfig,
}

/// Coordinates of the evaluation platform's ingestion endpoint. The API key
/// is deliberately absent here; it comes from the environment.
#[derive(Debug, Deserialize)]
pub struct SinkConfig {
    pub base_url: String,
    pub project: String,
    pub dataset: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Config {
    pub fn load(config_path: &str) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            EtlError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path, e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}
