//! Configuration management for the CLI

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use drift_lib::collector::DEFAULT_TIMEOUT;
use drift_lib::DEFAULT_CREDENTIAL_SECRET;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings read from the config file and `NSDRIFT_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Secret whose presence is compared
    #[serde(default = "default_credential_secret")]
    pub credential_secret: String,

    /// Per-cluster collection deadline; 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_credential_secret() -> String {
    DEFAULT_CREDENTIAL_SECRET.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Settings {
    /// Load settings, layering the environment over the config file
    ///
    /// An explicitly given file must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(path) = Self::default_path() {
                    builder = builder.add_source(config::File::from(path).required(false));
                }
            }
        }

        builder
            .add_source(config::Environment::with_prefix("NSDRIFT").try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    fn default_path() -> Option<PathBuf> {
        let home = dirs_next::home_dir()?;
        Some(home.join(".config").join("nsdrift").join("config.toml"))
    }
}
