//! Common types and utilities shared across CLI commands.

use clap::ValueEnum;
use serde::Serialize;
use trafficlayer::config::{CacheKind, ConfigFile};

use crate::error::CliError;

/// Tile store selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum CacheChoice {
    /// In-memory store, discarded on exit
    Memory,
    /// File-per-tile store under the configured cache directory
    Disk,
}

impl From<CacheChoice> for CacheKind {
    fn from(choice: CacheChoice) -> Self {
        match choice {
            CacheChoice::Memory => CacheKind::Memory,
            CacheChoice::Disk => CacheKind::Disk,
        }
    }
}

/// Resolve the traffic zoom from CLI args and config.
pub fn resolve_zoom(cli_zoom: Option<u8>, config: &ConfigFile) -> u8 {
    cli_zoom.unwrap_or(config.traffic.zoom)
}

/// Resolve the batch size from CLI args and config.
pub fn resolve_batch_size(cli_batch: Option<u32>, config: &ConfigFile) -> Result<u32, CliError> {
    match cli_batch {
        Some(0) => Err(CliError::InvalidArgument(
            "batch size must be at least 1".to_string(),
        )),
        Some(size) => Ok(size),
        None => Ok(config.traffic.batch_size),
    }
}

/// Pretty-print `value` as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(CliError::Output)?;
    println!("{}", json);
    Ok(())
}
