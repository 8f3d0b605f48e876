//! Cache provider implementations.
//!
//! - [`MemoryCacheProvider`]: in-memory store using moka
//! - [`DiskCacheProvider`]: one file per key under a root directory
//!
//! Use [`open_cache`](crate::cache::open_cache) to build one from configuration.

mod disk;
mod memory;

pub use disk::DiskCacheProvider;
pub use memory::MemoryCacheProvider;
