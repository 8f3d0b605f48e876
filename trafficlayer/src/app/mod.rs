//! Application bootstrap.
//!
//! Builds every long-lived handle once and passes it to the components
//! that need it:
//!
//! ```text
//! ConfigFile ──► AppConfig ──► TrafficLayerApp::start()
//!                                 ├─ open_cache ──► TileStoreClient
//!                                 ├─ InMemoryQuotaStore (seeded credentials)
//!                                 ├─ DecodeProxySource (reqwest)
//!                                 └─ TrafficService ──► Scheduler jobs
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::{ProxySource, TrafficLayerApp};
pub use config::AppConfig;
pub use error::AppError;
