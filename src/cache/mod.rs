//! Cache Module
//!
//! Provides in-memory caching with per-entry TTL expiration.

mod entry;
mod stats;
mod store;
mod ttl;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::Entry;
pub use stats::CacheStats;
pub use store::Cache;
pub use ttl::Ttl;

pub(crate) use store::Shared;
