//! Provider types and traits

use std::fmt;
use std::future::Future;

use crate::coord::TileCoord;
use crate::quota::ProviderCredential;

/// Errors that can occur when fetching raw congestion tiles.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed
    HttpError(String),
    /// Zoom level not supported by this source
    UnsupportedZoom(u8),
    /// Invalid response data from the source
    InvalidResponse(String),
    /// Source-specific error
    ProviderSpecific(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::UnsupportedZoom(zoom) => {
                write!(f, "Zoom level {} not supported by tile source", zoom)
            }
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ProviderError::ProviderSpecific(msg) => write!(f, "Provider error: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Opaque fetch-by-tile capability for raw congestion payloads.
///
/// The payload is returned as bytes and parsed by the caller; the source
/// knows nothing about its structure.
pub trait TileSource: Send + Sync {
    /// Fetches the raw congestion payload for one tile.
    ///
    /// # Arguments
    ///
    /// * `credential` - Credential selected for the batch this tile belongs to
    /// * `tile` - Tile coordinates
    ///
    /// # Returns
    ///
    /// The raw payload bytes or an error.
    fn fetch_tile(
        &self,
        credential: &ProviderCredential,
        tile: TileCoord,
    ) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;

    /// Returns the source's name for logging and identification.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ProviderError::HttpError("timeout".into()).to_string(),
            "HTTP error: timeout"
        );
        assert!(ProviderError::UnsupportedZoom(23).to_string().contains("23"));
    }
}
