use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_URL: &str =
    "https://www.oryxspioenkop.com/2022/02/attack-on-europe-documenting-equipment.html";

/// Runtime settings: defaults, then `oryx.toml`, then `ORYX_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub out_dir: PathBuf,
}

impl Settings {
    pub fn load() -> Result<Self> {
        defaults()?
            .add_source(File::with_name("oryx").required(false))
            .add_source(Environment::with_prefix("ORYX"))
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("url", DEFAULT_URL)?
        .set_default("timeout_secs", 30_i64)?
        .set_default("user_agent", concat!("oryx_scraper/", env!("CARGO_PKG_VERSION")))?
        .set_default("out_dir", "outputfiles")
}
