// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::storage::LocalStorage;
use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_upcoming_count() -> usize {
    1
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Overrides `<data dir>/events.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,

    /// Seed sample events when no data file exists yet.
    #[serde(default = "default_true")]
    pub seed_sample_data: bool,

    /// Plain `add` skips the overlap check when set.
    #[serde(default)]
    pub allow_overlapping_adds: bool,

    /// Number of events `next` shows without an explicit count.
    #[serde(default = "default_upcoming_count")]
    pub upcoming_default_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Match the serde defaults
            log_level: default_log_level(),
            data_file: None,
            seed_sample_data: true,
            allow_overlapping_adds: false,
            upcoming_default_count: 1,
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Loads the config, writing defaults first when the file is missing.
    /// A present but broken file is an error; it is never overwritten.
    pub fn load_or_init(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(config) => Ok(config),
            Err(e) if Self::is_missing_config_error(&e) => {
                let config = Self::default();
                config.save(ctx)?;
                log::info!("Wrote default configuration");
                Ok(config)
            }
            Err(e) => Err(e),
        }
    }

    /// True if `err` means the config file does not exist (explicit message or
    /// an IO NotFound anywhere in the chain).
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    /// Where events are stored: the configured override or the context default.
    pub fn events_path(&self, ctx: &dyn AppContext) -> Result<PathBuf> {
        match &self.data_file {
            Some(p) => Ok(p.clone()),
            None => ctx.get_events_path(),
        }
    }
}
