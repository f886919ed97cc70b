//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

// == Cache Entry ==
/// A single cache entry: the stored value plus its timing metadata.
///
/// `expiration` is an instant in nanoseconds since the Unix epoch. Zero means
/// the entry never expires; it is never negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry<V> {
    /// The stored value
    pub value: V,
    /// Wall-clock time the entry was inserted
    pub created: DateTime<Utc>,
    /// Expiration instant (Unix nanoseconds), 0 = no expiration
    pub expiration: i64,
}

impl<V> Entry<V> {
    // == Constructor ==
    /// Creates a new entry that expires `ttl` from now.
    ///
    /// A zero `ttl` produces an entry that never expires.
    pub fn new(value: V, ttl: Duration) -> Self {
        let created = Utc::now();
        let expiration = if ttl.is_zero() {
            0
        } else {
            let ttl_nanos = i64::try_from(ttl.as_nanos()).unwrap_or(i64::MAX);
            nanos_of(&created).saturating_add(ttl_nanos)
        };

        Self {
            value,
            created,
            expiration,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_nanos())
    }

    /// Checks expiration against a caller-supplied instant.
    ///
    /// An entry is expired only once `now` is strictly past its expiration
    /// instant; at the exact instant it is still live.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expiration > 0 && now > self.expiration
    }

    /// Returns true if the entry was stored without a TTL.
    pub fn never_expires(&self) -> bool {
        self.expiration == 0
    }

    /// Returns the expiration instant, or None if the entry never expires.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        (!self.never_expires()).then(|| Utc.timestamp_nanos(self.expiration))
    }

    // == Time To Live ==
    /// Returns the remaining TTL, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the TTL has elapsed
    /// - `Some(remaining)` if the entry has a TTL and is still live
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        if self.never_expires() {
            return None;
        }
        let now = current_timestamp_nanos();
        let remaining = u64::try_from(self.expiration.saturating_sub(now)).unwrap_or(0);
        Some(Duration::from_nanos(remaining))
    }
}

// == Utility Functions ==
/// Returns the current Unix timestamp in nanoseconds.
pub(crate) fn current_timestamp_nanos() -> i64 {
    nanos_of(&Utc::now())
}

// Saturates for instants past the year 2262, where i64 nanoseconds run out.
fn nanos_of(instant: &DateTime<Utc>) -> i64 {
    instant.timestamp_nanos_opt().unwrap_or(i64::MAX)
}
