//! Domain-specific cache clients.
//!
//! These clients wrap the generic `Cache` trait with domain-specific key
//! translation.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │       TileStoreClient        │
//! │ (TileCoord, TimeBucket) → key│
//! └──────────────┬───────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────┐
//! │        Arc<dyn Cache>        │
//! │ string → Vec<u8> (upsert)    │
//! └──────────────────────────────┘
//! ```

mod tile;

pub use tile::TileStoreClient;
