//! ttl_cache - An in-process key-value cache with per-entry TTL
//!
//! Entries expire lazily on read and are reclaimed by an optional background
//! sweep running on the Tokio runtime.

pub mod cache;
pub mod config;
pub mod error;
mod tasks;

pub use cache::{Cache, CacheStats, Entry, Ttl};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
