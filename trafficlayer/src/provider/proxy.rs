//! Decode-proxy tile source.
//!
//! Upstream congestion tiles are vector tiles; a local proxy service decodes
//! them into JSON. This source only speaks the proxy's contract.
//!
//! # URL Pattern
//!
//! `{base}/decode-tile?z={z}&x={x}&y={y}&accessToken={token}&platform={provider}`
//!
//! The response body is passed through untouched.

use reqwest::Url;

use crate::coord::{TileCoord, MAX_ZOOM};
use crate::provider::{AsyncHttpClient, ProviderError, TileSource};
use crate::quota::ProviderCredential;

/// Default proxy address.
pub const DEFAULT_PROXY_URL: &str = "http://localhost:6000";

/// Tile source backed by the decode proxy.
pub struct DecodeProxySource<C: AsyncHttpClient> {
    http_client: C,
    base_url: String,
}

impl<C: AsyncHttpClient> DecodeProxySource<C> {
    /// Creates a source for the proxy at `base_url`.
    ///
    /// A trailing slash on `base_url` is ignored.
    pub fn new(http_client: C, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the proxy URL, percent-encoding the credential fields.
    fn build_url(
        &self,
        credential: &ProviderCredential,
        tile: TileCoord,
    ) -> Result<String, ProviderError> {
        let endpoint = format!("{}/decode-tile", self.base_url);
        let url = Url::parse_with_params(
            &endpoint,
            &[
                ("z", tile.zoom.to_string()),
                ("x", tile.x.to_string()),
                ("y", tile.y.to_string()),
                ("accessToken", credential.token.clone()),
                ("platform", credential.provider.clone()),
            ],
        )
        .map_err(|e| ProviderError::HttpError(format!("Invalid proxy URL {}: {}", endpoint, e)))?;

        Ok(url.into())
    }
}

impl<C: AsyncHttpClient> TileSource for DecodeProxySource<C> {
    async fn fetch_tile(
        &self,
        credential: &ProviderCredential,
        tile: TileCoord,
    ) -> Result<Vec<u8>, ProviderError> {
        if tile.zoom > MAX_ZOOM {
            return Err(ProviderError::UnsupportedZoom(tile.zoom));
        }

        let url = self.build_url(credential, tile)?;
        self.http_client.get(&url).await
    }

    fn name(&self) -> &str {
        "decode-proxy"
    }
}
