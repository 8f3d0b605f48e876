//! Provider quota selection.
//!
//! Congestion tiles are fetched under per-credential request limits. Before a
//! batch is fetched, [`QuotaSelector::select_provider`] picks a credential
//! with enough remaining capacity for the whole batch; once the batch has
//! resolved, [`QuotaSelector::record_usage`] adds what it actually consumed.
//!
//! Counters are reset periodically by [`crate::jobs::QuotaResetJob`].

mod selector;
mod store;
mod types;

pub use selector::QuotaSelector;
pub use store::{InMemoryQuotaStore, QuotaStore};
pub use types::{ProviderCredential, QuotaError};
