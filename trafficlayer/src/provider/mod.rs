//! Congestion tile source abstraction
//!
//! This module provides the [`TileSource`] trait for fetching raw congestion
//! payloads by tile, an injectable HTTP client, and the decode-proxy source
//! used in production.
//!
//! ```ignore
//! use trafficlayer::provider::{AsyncReqwestClient, DecodeProxySource};
//!
//! let http_client = AsyncReqwestClient::new()?;
//! let source = DecodeProxySource::new(http_client, "http://localhost:6000");
//! let raw = source.fetch_tile(&credential, tile).await?;
//! ```

mod http;
mod proxy;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_HTTP_TIMEOUT};
pub use proxy::{DecodeProxySource, DEFAULT_PROXY_URL};
pub use types::{ProviderError, TileSource};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
