use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::schema::SiteConfig;

const CONFIG_FILE: &str = "jobs_notifier";
const ENV_PREFIX: &str = "JOBS";

/// Runtime settings: defaults, then `jobs_notifier.toml` if present, then
/// `JOBS_*` environment variables (`JOBS_SITE__LOCATION=haifa`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_dir: PathBuf,
    pub output_dir: PathBuf,
    pub user_agent: String,
    pub site: SiteConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            log_dir: PathBuf::from("logs"),
            output_dir: PathBuf::from("."),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into(),
            site: SiteConfig::default(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .context("Failed to load settings")
    }
}

// ── Tests ──
