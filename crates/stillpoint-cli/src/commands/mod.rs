pub mod catalog;
pub mod config;
pub mod recommend;

use std::path::Path;

use chrono::{DateTime, FixedOffset, Local};
use stillpoint_core::{load_history, Catalog, Config, HistoryEntry};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Catalog from `--catalog`, then the configured path, then the built-in set.
pub fn resolve_catalog(
    flag: Option<&Path>,
    config: &Config,
) -> Result<Catalog, Box<dyn std::error::Error>> {
    if let Some(path) = flag {
        return Ok(Catalog::load(path)?);
    }
    if let Some(path) = &config.catalog.path {
        return Ok(Catalog::load(path)?);
    }
    Ok(Catalog::builtin())
}

/// Read a history file, reporting skipped records on stderr.
pub fn read_history(path: &Path) -> Result<Vec<HistoryEntry>, Box<dyn std::error::Error>> {
    let load = load_history(path)?;
    if load.skipped > 0 {
        eprintln!(
            "warning: skipped {} unreadable record(s) in {}",
            load.skipped,
            path.display()
        );
    }
    Ok(load.entries)
}

/// Parse `--at` or fall back to the local clock.
pub fn parse_now(at: Option<&str>) -> Result<DateTime<FixedOffset>, Box<dyn std::error::Error>> {
    match at {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map_err(|e| format!("Invalid --at '{value}': {e} (expected RFC 3339)").into()),
        None => Ok(Local::now().fixed_offset()),
    }
}
