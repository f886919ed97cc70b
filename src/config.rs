//! Configuration Module
//!
//! Cache configuration that can be built in code or deserialized as part of a
//! host application's own configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Cache configuration parameters.
///
/// Both durations are in milliseconds. Zero has a special meaning for each:
/// a zero default TTL stores entries that never expire, and a zero cleanup
/// interval disables the background sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL applied when `set` is called without an explicit TTL
    pub default_ttl_ms: u64,
    /// Interval between background sweep passes
    pub cleanup_interval_ms: u64,
}

impl CacheConfig {
    /// Sets the default TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl_ms = duration_to_ms(ttl);
        self
    }

    /// Sets the sweep interval. `Duration::ZERO` disables the sweep.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval_ms = duration_to_ms(interval);
        self
    }

    /// Returns the default TTL as a `Duration`.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    /// Returns the sweep interval as a `Duration`.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: 0,
            cleanup_interval_ms: 1000,
        }
    }
}

// Zero is reserved for "disabled", so any non-zero duration rounds up to at
// least one millisecond.
fn duration_to_ms(duration: Duration) -> u64 {
    if duration.is_zero() {
        return 0;
    }
    u64::try_from(duration.as_millis())
        .unwrap_or(u64::MAX)
        .max(1)
}
