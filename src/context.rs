// File: ./src/context.rs
//! Where schedly keeps its files.
//!
//! Three files matter: `config.toml` in the config directory, and
//! `events.json` plus `schedly.log` in the data directory. Code that touches
//! any of them asks an [`AppContext`] instead of building paths itself.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub trait AppContext: Send + Sync + std::fmt::Debug {
    /// Holds the events file and the log. Created on demand.
    fn get_data_dir(&self) -> Result<PathBuf>;
    /// Holds `config.toml`. Created on demand.
    fn get_config_dir(&self) -> Result<PathBuf>;

    fn get_config_file_path(&self) -> Result<PathBuf> {
        Ok(self.get_config_dir()?.join("config.toml"))
    }

    /// Default events file; `Config::data_file` can point elsewhere.
    fn get_events_path(&self) -> Result<PathBuf> {
        Ok(self.get_data_dir()?.join("events.json"))
    }

    fn get_log_path(&self) -> Result<PathBuf> {
        Ok(self.get_data_dir()?.join("schedly.log"))
    }
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf> {
    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create directory: {:?}", path))?;
    Ok(path)
}

/// Platform directories, or `<root>/data` and `<root>/config` when the binary
/// was started with `--root`.
#[derive(Clone, Debug)]
pub struct StandardContext {
    override_root: Option<PathBuf>,
}

impl StandardContext {
    pub fn new(override_root: Option<PathBuf>) -> Self {
        Self { override_root }
    }

    fn resolve(&self, sub: &str, platform: fn(&ProjectDirs) -> &Path) -> Result<PathBuf> {
        let dir = match &self.override_root {
            Some(root) => root.join(sub),
            None => {
                let proj = ProjectDirs::from("com", "schedly", "schedly")
                    .ok_or_else(|| anyhow::anyhow!("No home directory"))?;
                platform(&proj).to_path_buf()
            }
        };
        ensure_dir(dir)
    }
}

impl AppContext for StandardContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        self.resolve("data", ProjectDirs::data_dir)
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        self.resolve("config", ProjectDirs::config_dir)
    }
}

/// Scratch layout for tests that load or save events and config.
///
/// Each instance gets its own `schedly_test_<uuid>` directory, so tests can
/// run in parallel; the directory is deleted when the context is dropped.
#[derive(Clone, Debug)]
pub struct TestContext {
    pub root: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("schedly_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&root).expect("failed to create TestContext temp dir");
        Self { root }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        ensure_dir(self.root.join("data"))
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        ensure_dir(self.root.join("config"))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}
