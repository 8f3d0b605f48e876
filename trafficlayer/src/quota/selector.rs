//! Credential selection.

use std::sync::Arc;

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{debug, warn};

use super::store::QuotaStore;
use super::types::{ProviderCredential, QuotaError};

/// Picks a credential with enough remaining quota for a batch and records
/// what the batch consumed.
#[derive(Clone)]
pub struct QuotaSelector {
    store: Arc<dyn QuotaStore>,
}

impl QuotaSelector {
    pub fn new(store: Arc<dyn QuotaStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn QuotaStore> {
        &self.store
    }

    /// Selects uniformly at random among credentials that can serve
    /// `required` requests.
    ///
    /// # Errors
    ///
    /// Returns `QuotaError::NoQuotaAvailable` when no credential qualifies.
    pub async fn select_provider(&self, required: u64) -> Result<ProviderCredential, QuotaError> {
        let candidates = self.store.eligible(required).await?;
        let chosen = {
            let mut rng = rand::rng();
            choose_credential(&candidates, required, &mut rng)
        };
        self.log_choice(chosen, candidates.len(), required)
    }

    /// Like [`select_provider`](Self::select_provider) with a caller-supplied RNG.
    pub async fn select_provider_with<R: Rng + Send>(
        &self,
        required: u64,
        rng: &mut R,
    ) -> Result<ProviderCredential, QuotaError> {
        let candidates = self.store.eligible(required).await?;
        let chosen = choose_credential(&candidates, required, rng);
        self.log_choice(chosen, candidates.len(), required)
    }

    /// Adds `count` consumed requests to the credential identified by `token`.
    ///
    /// A count of zero is not written.
    pub async fn record_usage(&self, token: &str, count: u64) -> Result<(), QuotaError> {
        if count == 0 {
            return Ok(());
        }
        self.store.increment(token, count).await
    }

    fn log_choice(
        &self,
        chosen: Option<ProviderCredential>,
        candidates: usize,
        required: u64,
    ) -> Result<ProviderCredential, QuotaError> {
        match chosen {
            Some(credential) => {
                debug!(
                    provider = %credential.provider,
                    token = %credential.masked_token(),
                    remaining = credential.remaining(),
                    candidates,
                    required,
                    "Selected provider credential"
                );
                Ok(credential)
            }
            None => {
                warn!(required, "No provider credential with sufficient quota");
                Err(QuotaError::NoQuotaAvailable { required })
            }
        }
    }
}

/// Uniform choice among candidates that can serve `required`.
///
/// Re-checks eligibility so a store returning stale rows never yields an
/// over-limit credential.
fn choose_credential<R: Rng + ?Sized>(
    candidates: &[ProviderCredential],
    required: u64,
    rng: &mut R,
) -> Option<ProviderCredential> {
    let eligible: Vec<&ProviderCredential> =
        candidates.iter().filter(|c| c.can_serve(required)).collect();
    eligible.choose(rng).map(|c| (*c).clone())
}
