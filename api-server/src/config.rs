//! Server configuration from environment variables

use std::path::PathBuf;

use anyhow::{bail, Context};
use inventu_core::openai::SimulationConfig;

use crate::auth::digest_api_key;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DATA_DIR: &str = ".inventu-data";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// SHA-256 hex digest of `API_KEY`; `None` leaves the API open
    pub api_key_digest: Option<String>,
    pub data_dir: PathBuf,
    pub simulation: SimulationConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let api_key_digest = var("API_KEY").map(|key| digest_api_key(&key));

        let data_dir = var("INVENTU_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let mut simulation = SimulationConfig::default();
        if let Some(raw) = var("INVENTU_SIM_FAILURE_RATE") {
            let rate: f64 = raw
                .parse()
                .with_context(|| format!("INVENTU_SIM_FAILURE_RATE must be a number, got '{}'", raw))?;
            if !(0.0..=1.0).contains(&rate) {
                bail!("INVENTU_SIM_FAILURE_RATE must be between 0 and 1, got {}", rate);
            }
            simulation = simulation.with_failure_rate(rate);
        }

        Ok(Self {
            port,
            api_key_digest,
            data_dir,
            simulation,
        })
    }
}
