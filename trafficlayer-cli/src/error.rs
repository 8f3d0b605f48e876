//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use trafficlayer::app::AppError;
use trafficlayer::config::ConfigFileError;
use trafficlayer::traffic::TrafficError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Config file could not be read, parsed or written
    Config(ConfigFileError),
    /// Invalid command-line argument
    InvalidArgument(String),
    /// Failed to start the application
    Startup(AppError),
    /// Failed to write request counters back to the config file
    QuotaSave(AppError),
    /// Traffic service call failed
    Traffic(TrafficError),
    /// Failed to read the route file
    RouteRead { path: PathBuf, error: std::io::Error },
    /// Route file is not a routing-engine response
    RouteParse {
        path: PathBuf,
        error: serde_json::Error,
    },
    /// Route response contained no routes
    NoRoute(PathBuf),
    /// Failed to serialize command output
    Output(serde_json::Error),
    /// Some regions could not be warmed
    PrewarmIncomplete(Vec<String>),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(_) => {
                eprintln!();
                eprintln!(
                    "Check {} or run 'trafficlayer init' to write a fresh one.",
                    trafficlayer::config::config_file_path().display()
                );
            }
            CliError::Traffic(TrafficError::NoQuotaAvailable { .. }) => {
                eprintln!();
                eprintln!("Every configured credential is at its request limit.");
                eprintln!("Add a [credential.<name>] section or wait for the quota reset.");
            }
            CliError::QuotaSave(_) => {
                eprintln!();
                eprintln!("Requests made by this run are not counted in the config file.");
            }
            CliError::PrewarmIncomplete(_) => {
                eprintln!();
                eprintln!("See the log file for the per-region errors.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Startup(e) => write!(f, "Failed to start: {}", e),
            CliError::QuotaSave(e) => write!(f, "{}", e),
            CliError::Traffic(e) => write!(f, "Traffic lookup failed: {}", e),
            CliError::RouteRead { path, error } => {
                write!(f, "Failed to read route file '{}': {}", path.display(), error)
            }
            CliError::RouteParse { path, error } => {
                write!(f, "Failed to parse route file '{}': {}", path.display(), error)
            }
            CliError::NoRoute(path) => {
                write!(f, "Route file '{}' contains no routes", path.display())
            }
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
            CliError::PrewarmIncomplete(regions) => {
                write!(f, "Failed to warm regions: {}", regions.join(", "))
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Startup(e) | CliError::QuotaSave(e) => Some(e),
            CliError::Traffic(e) => Some(e),
            CliError::RouteRead { error, .. } => Some(error),
            CliError::RouteParse { error, .. } => Some(error),
            CliError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::QuotaSave(_) => CliError::QuotaSave(e),
            _ => CliError::Startup(e),
        }
    }
}

impl From<TrafficError> for CliError {
    fn from(e: TrafficError) -> Self {
        CliError::Traffic(e)
    }
}
