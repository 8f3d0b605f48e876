//! Credential storage.
//!
//! The [`QuotaStore`] trait is the seam to whatever holds credentials and
//! their counters. Methods return boxed futures so the store can be shared
//! as `Arc<dyn QuotaStore>`.

use dashmap::DashMap;

use super::types::{ProviderCredential, QuotaError};
use crate::cache::BoxFuture;

/// Shared credential store.
///
/// Implementations must apply `increment` atomically per credential.
/// Selection and increment are separate calls, so two callers may both
/// select the same credential before either records usage.
pub trait QuotaStore: Send + Sync {
    /// Inserts or replaces a credential, keyed by token.
    fn upsert(&self, credential: ProviderCredential) -> BoxFuture<'_, Result<(), QuotaError>>;

    /// Credentials with at least `required` requests remaining.
    fn eligible(&self, required: u64) -> BoxFuture<'_, Result<Vec<ProviderCredential>, QuotaError>>;

    /// Adds `count` to the credential's `request_count`.
    ///
    /// # Errors
    ///
    /// Returns `QuotaError::UnknownCredential` if no credential has `token`.
    fn increment(&self, token: &str, count: u64) -> BoxFuture<'_, Result<(), QuotaError>>;

    /// Sets every credential's `request_count` to zero. Returns how many were reset.
    fn reset_all(&self) -> BoxFuture<'_, Result<usize, QuotaError>>;

    /// All stored credentials.
    fn list(&self) -> BoxFuture<'_, Result<Vec<ProviderCredential>, QuotaError>>;
}

/// Process-local quota store backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryQuotaStore {
    credentials: DashMap<String, ProviderCredential>,
}

impl InMemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `credentials`.
    pub fn with_credentials(credentials: impl IntoIterator<Item = ProviderCredential>) -> Self {
        let store = Self::new();
        for credential in credentials {
            store.credentials.insert(credential.token.clone(), credential);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    fn sorted(mut credentials: Vec<ProviderCredential>) -> Vec<ProviderCredential> {
        credentials.sort_by(|a, b| a.token.cmp(&b.token));
        credentials
    }
}

impl QuotaStore for InMemoryQuotaStore {
    fn upsert(&self, credential: ProviderCredential) -> BoxFuture<'_, Result<(), QuotaError>> {
        Box::pin(async move {
            self.credentials.insert(credential.token.clone(), credential);
            Ok(())
        })
    }

    fn eligible(&self, required: u64) -> BoxFuture<'_, Result<Vec<ProviderCredential>, QuotaError>> {
        Box::pin(async move {
            let eligible = self
                .credentials
                .iter()
                .filter(|entry| entry.value().can_serve(required))
                .map(|entry| entry.value().clone())
                .collect();
            Ok(Self::sorted(eligible))
        })
    }

    fn increment(&self, token: &str, count: u64) -> BoxFuture<'_, Result<(), QuotaError>> {
        let token = token.to_string();
        Box::pin(async move {
            match self.credentials.get_mut(&token) {
                Some(mut entry) => {
                    entry.request_count = entry.request_count.saturating_add(count);
                    Ok(())
                }
                None => Err(QuotaError::UnknownCredential(token)),
            }
        })
    }

    fn reset_all(&self) -> BoxFuture<'_, Result<usize, QuotaError>> {
        Box::pin(async move {
            let mut reset = 0;
            for mut entry in self.credentials.iter_mut() {
                entry.request_count = 0;
                reset += 1;
            }
            Ok(reset)
        })
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<ProviderCredential>, QuotaError>> {
        Box::pin(async move {
            let all = self
                .credentials
                .iter()
                .map(|entry| entry.value().clone())
                .collect();
            Ok(Self::sorted(all))
        })
    }
}
