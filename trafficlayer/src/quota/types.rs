//! Quota types.

use thiserror::Error;

/// An access credential for an upstream congestion-tile provider.
///
/// `request_count` counts tiles consumed since the last reset. A credential
/// is eligible for a batch of `n` tiles while `request_limit - request_count >= n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCredential {
    /// Provider (platform) name passed through to the tile source
    pub provider: String,
    /// Access token, unique per credential
    pub token: String,
    pub request_limit: u64,
    pub request_count: u64,
}

impl ProviderCredential {
    pub fn new(provider: impl Into<String>, token: impl Into<String>, request_limit: u64) -> Self {
        Self {
            provider: provider.into(),
            token: token.into(),
            request_limit,
            request_count: 0,
        }
    }

    /// Requests left before the limit is reached.
    pub fn remaining(&self) -> u64 {
        self.request_limit.saturating_sub(self.request_count)
    }

    /// Whether this credential can absorb `required` more requests.
    pub fn can_serve(&self, required: u64) -> bool {
        self.remaining() >= required
    }

    /// Token with everything but the last four characters masked, for logs.
    pub fn masked_token(&self) -> String {
        let visible: String = self
            .token
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("***{}", visible)
    }
}

/// Errors raised by quota selection and bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuotaError {
    /// No stored credential has enough remaining quota.
    #[error("No provider credential has {required} requests remaining")]
    NoQuotaAvailable { required: u64 },

    /// Usage was recorded against a token the store does not know.
    #[error("Unknown provider credential: {0}")]
    UnknownCredential(String),

    /// The backing store failed.
    #[error("Quota store error: {0}")]
    Store(String),
}
