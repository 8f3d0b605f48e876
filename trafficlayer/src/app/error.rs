//! Application error types.

use std::fmt;

use crate::cache::ServiceCacheError;
use crate::jobs::JobError;
use crate::provider::ProviderError;
use crate::quota::QuotaError;

/// Errors from starting the application or persisting its state.
#[derive(Debug)]
pub enum AppError {
    /// Failed to open the tile store.
    CacheStart(ServiceCacheError),

    /// Failed to build the HTTP client.
    HttpClient(ProviderError),

    /// Failed to seed the quota store.
    QuotaStore(QuotaError),

    /// Configuration error.
    Config(String),

    /// Failed to write quota counters back to the config file.
    QuotaSave(JobError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::CacheStart(e) => write!(f, "Failed to open tile store: {}", e),
            AppError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            AppError::QuotaStore(e) => write!(f, "Failed to load credentials: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::QuotaSave(e) => write!(f, "Failed to save quota usage: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::CacheStart(e) => Some(e),
            AppError::HttpClient(e) => Some(e),
            AppError::QuotaStore(e) => Some(e),
            AppError::Config(_) => None,
            AppError::QuotaSave(e) => Some(e),
        }
    }
}

impl From<ServiceCacheError> for AppError {
    fn from(e: ServiceCacheError) -> Self {
        AppError::CacheStart(e)
    }
}

impl From<QuotaError> for AppError {
    fn from(e: QuotaError) -> Self {
        AppError::QuotaStore(e)
    }
}
