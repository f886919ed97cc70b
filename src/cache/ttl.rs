//! Per-call TTL selection for `Cache::set`.

use std::time::Duration;

/// How long an entry written by `set` should live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// Use the cache's configured default TTL
    #[default]
    Default,
    /// Never expire, regardless of the configured default
    Never,
    /// Expire after the given duration. A zero duration means `Default`.
    For(Duration),
}

impl Ttl {
    /// Resolves to the effective lifetime, with `Duration::ZERO` meaning
    /// "never expires".
    pub fn resolve(self, default_ttl: Duration) -> Duration {
        match self {
            Ttl::Never => Duration::ZERO,
            Ttl::For(duration) if !duration.is_zero() => duration,
            Ttl::For(_) | Ttl::Default => default_ttl,
        }
    }
}

impl From<Duration> for Ttl {
    fn from(duration: Duration) -> Self {
        if duration.is_zero() {
            Ttl::Default
        } else {
            Ttl::For(duration)
        }
    }
}

impl From<Option<Duration>> for Ttl {
    fn from(duration: Option<Duration>) -> Self {
        duration.map_or(Ttl::Default, Ttl::from)
    }
}
