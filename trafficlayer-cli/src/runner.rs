//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and application
//! startup so command handlers stay small.

use std::path::{Path, PathBuf};

use tracing::info;
use trafficlayer::app::{AppConfig, TrafficLayerApp};
use trafficlayer::config::{config_file_path, CacheKind, ConfigFile};
use trafficlayer::logging::{default_log_dir, default_log_file, init_logging, LoggingGuard};
use trafficlayer::provider::TileSource;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    _logging_guard: LoggingGuard,
    config: ConfigFile,
    config_path: PathBuf,
}

impl CliRunner {
    /// Load the config file (defaults when absent) and initialize logging.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Overrides `~/.trafficlayer/config.ini` when set
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, CliError> {
        let config_path = config_path.unwrap_or_else(config_file_path);
        let config = ConfigFile::load_from(&config_path)?;

        let logging_guard = init_logging(&default_log_dir(), default_log_file())
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
            config_path,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("TrafficLayer v{}", trafficlayer::VERSION);
        info!(config = %self.config_path.display(), "TrafficLayer CLI: {} command", command);
    }

    /// Start the application, optionally overriding the tile store backend.
    pub async fn start_app(&self, cache: Option<CacheKind>) -> Result<TrafficLayerApp, CliError> {
        let mut config = self.config.clone();
        if let Some(kind) = cache {
            config.cache.provider = kind;
        }

        let app = TrafficLayerApp::start(AppConfig::from_config_file(&config)).await?;
        info!(
            source = app.service().fetcher().source().name(),
            store = app.service().fetcher().store().provider_name(),
            "Application started"
        );
        Ok(app)
    }

    /// Write the app's request counters back to the loaded config file.
    pub async fn save_quota_usage(&self, app: &TrafficLayerApp) -> Result<(), CliError> {
        let saved = app.save_quota_usage(&self.config_path).await?;
        if saved > 0 {
            info!(credentials = saved, "Quota usage saved");
        }
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
