//! File logging bootstrap.
//!
//! The command loop owns stdout, so log records go to `<data dir>/schedly.log`
//! through `simplelog`. Initialization happens at most once per process.

use crate::context::AppContext;
use anyhow::{Context, Result};
use log::LevelFilter;
use once_cell::sync::OnceCell;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;

static LOG_PATH: OnceCell<PathBuf> = OnceCell::new();

/// Parses a level name ("error".."trace", "off"); unknown names are an error.
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(level.trim())
        .map_err(|_| anyhow::anyhow!("Unsupported log level '{}'", level))
}

/// Starts appending log records to the context's log file.
///
/// Calling it again is a no-op and returns the path chosen the first time.
pub fn init(ctx: &dyn AppContext, level: &str) -> Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let filter = parse_level(level)?;
    let path = ctx.get_log_path()?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file '{}'", path.display()))?;

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build();

    WriteLogger::init(filter, config, file)
        .map_err(|e| anyhow::anyhow!("Failed to start logger: {}", e))?;

    let path = LOG_PATH.get_or_init(|| path).clone();
    log::info!(
        "schedly v{} started, level={} log={}",
        env!("CARGO_PKG_VERSION"),
        filter,
        path.display()
    );
    Ok(path)
}
