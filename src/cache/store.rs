//! Cache Store Module
//!
//! Main cache engine: a lock-guarded HashMap with lazy TTL expiration and an
//! optional background sweep.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::entry::current_timestamp_nanos;
use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheStats, Entry, Ttl};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_sweep_task;

// == Shared State ==
/// State reachable from both the cache handle and its sweep task.
#[derive(Debug)]
pub(crate) struct Shared<V> {
    entries: RwLock<HashMap<String, Entry<V>>>,
    stats: StatsRecorder,
}

impl<V> Shared<V> {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: StatsRecorder::default(),
        }
    }

    // == Sweep ==
    /// Runs one sweep pass and returns the number of entries removed.
    pub(crate) async fn sweep(&self) -> usize {
        let expired_keys = self.expired_keys(current_timestamp_nanos()).await;
        let removed = if expired_keys.is_empty() {
            0
        } else {
            self.remove_expired(&expired_keys).await
        };

        self.stats.record_sweep(removed);
        removed
    }

    /// Collects the keys expired as of `now` under the shared lock.
    pub(crate) async fn expired_keys(&self, now: i64) -> Vec<String> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Removes the given keys under the exclusive lock, skipping any key that
    /// was deleted or refreshed with a live TTL since it was collected.
    pub(crate) async fn remove_expired(&self, keys: &[String]) -> usize {
        let mut entries = self.entries.write().await;
        let now = current_timestamp_nanos();
        let mut removed = 0;

        for key in keys {
            if entries.get(key).is_some_and(|entry| entry.is_expired_at(now)) {
                entries.remove(key);
                removed += 1;
            }
        }

        removed
    }
}

// == Sweep State ==
#[derive(Debug)]
enum SweepState {
    /// Sweeping is disabled, or waiting for a runtime to start on
    Idle,
    Running(JoinHandle<()>),
    Closed,
}

// == Cache ==
/// Thread-safe key-value cache with per-entry TTL.
///
/// Expired entries are hidden from lookups immediately and physically removed
/// by the background sweep (when enabled), by `delete_expired`, or by a later
/// `set`/`delete` on the same key. Share a cache between tasks with `Arc`.
///
/// Dropping the cache stops its sweep task.
#[derive(Debug)]
pub struct Cache<V> {
    shared: Arc<Shared<V>>,
    /// TTL applied when `set` is called with `Ttl::Default` or a zero duration
    default_ttl: Duration,
    /// Interval between sweep passes, zero when sweeping is disabled
    cleanup_interval: Duration,
    shutdown: watch::Sender<bool>,
    sweeper: Mutex<SweepState>,
    /// Set while a positive interval is configured but no task is spawned yet
    sweep_pending: AtomicBool,
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL for entries set without one, zero = never expire
    /// * `cleanup_interval` - Interval between background sweeps, zero = none
    ///
    /// The sweep task is spawned on the current Tokio runtime. When built
    /// outside a runtime, the task is spawned by the first `set` that runs
    /// inside one.
    pub fn new(default_ttl: Duration, cleanup_interval: Duration) -> Self {
        let mut cache = Self {
            shared: Arc::new(Shared::new()),
            default_ttl,
            cleanup_interval,
            shutdown: watch::channel(false).0,
            sweeper: Mutex::new(SweepState::Idle),
            sweep_pending: AtomicBool::new(false),
        };

        if !cleanup_interval.is_zero() {
            match cache.spawn_sweeper() {
                Some(handle) => *cache.sweeper.get_mut() = SweepState::Running(handle),
                None => {
                    debug!("No Tokio runtime available, TTL sweep deferred until first set");
                    *cache.sweep_pending.get_mut() = true;
                }
            }
        }

        cache
    }

    /// Creates a cache from a `CacheConfig`.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.default_ttl(), config.cleanup_interval())
    }

    // == Set ==
    /// Stores a value, replacing any existing entry for the key.
    ///
    /// `ttl` accepts a `Ttl`, a `Duration` or an `Option<Duration>`; zero and
    /// `None` use the configured default TTL.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: impl Into<Ttl>) {
        if self.sweep_pending.load(Ordering::Acquire) {
            self.start_deferred_sweep().await;
        }

        let lifetime = ttl.into().resolve(self.default_ttl);
        let entry = Entry::new(value, lifetime);

        self.shared.entries.write().await.insert(key.into(), entry);
    }

    // == Get ==
    /// Returns a clone of the value if the key is present and live.
    ///
    /// An expired entry is reported absent but left in place.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.lookup(key, |entry| entry.value.clone()).await
    }

    /// Returns a copy of the full entry if the key is present and live.
    pub async fn get_item(&self, key: &str) -> Result<Entry<V>> {
        self.lookup(key, Entry::clone)
            .await
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    async fn lookup<T>(&self, key: &str, read: impl FnOnce(&Entry<V>) -> T) -> Option<T> {
        let found = {
            let entries = self.shared.entries.read().await;
            entries
                .get(key)
                .filter(|entry| !entry.is_expired())
                .map(read)
        };

        self.shared.stats.record_lookup(found.is_some());
        found
    }

    // == Is Expired ==
    /// Returns true if the key is absent or its entry has expired.
    ///
    /// This is a query only; the entry is not removed.
    pub async fn is_expired(&self, key: &str) -> bool {
        let entries = self.shared.entries.read().await;
        entries.get(key).map_or(true, Entry::is_expired)
    }

    // == Count ==
    /// Returns the number of entries physically held.
    ///
    /// This includes entries that have expired but not yet been swept, so it
    /// is not the number of live entries.
    pub async fn count(&self) -> usize {
        self.shared.entries.read().await.len()
    }

    /// Returns true if no entries are held, expired or not.
    pub async fn is_empty(&self) -> bool {
        self.count().await == 0
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Works on physical presence: an expired entry that has not been swept
    /// yet is still removed successfully.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.shared
            .entries
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    // == Delete Expired ==
    /// Runs one sweep pass immediately and returns the number of entries removed.
    pub async fn delete_expired(&self) -> usize {
        self.shared.sweep().await
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let total_entries = self.count().await;
        self.shared.stats.snapshot(total_entries)
    }

    // == Close ==
    /// Stops the background sweep and waits for it to exit.
    ///
    /// The cache remains usable afterwards with lazy expiration only. Calling
    /// `close` more than once is a no-op.
    pub async fn close(&self) {
        self.sweep_pending.store(false, Ordering::Release);
        let state = std::mem::replace(&mut *self.sweeper.lock().await, SweepState::Closed);
        let SweepState::Running(handle) = state else {
            return;
        };

        self.shutdown.send_replace(true);
        if let Err(err) = handle.await {
            warn!("TTL sweep task ended abnormally: {}", err);
        }
        debug!("Cache closed");
    }

    /// Returns true while a background sweep task is running.
    pub async fn is_sweeping(&self) -> bool {
        match &*self.sweeper.lock().await {
            SweepState::Running(handle) => !handle.is_finished(),
            SweepState::Idle | SweepState::Closed => false,
        }
    }

    /// Spawns the sweep task if called from within a Tokio runtime.
    fn spawn_sweeper(&self) -> Option<JoinHandle<()>> {
        let runtime = Handle::try_current().ok()?;
        Some(spawn_sweep_task(
            &runtime,
            Arc::downgrade(&self.shared),
            self.cleanup_interval,
            self.shutdown.subscribe(),
        ))
    }

    async fn start_deferred_sweep(&self) {
        let mut state = self.sweeper.lock().await;
        if !matches!(*state, SweepState::Idle) || !self.sweep_pending.load(Ordering::Acquire) {
            return;
        }

        if let Some(handle) = self.spawn_sweeper() {
            *state = SweepState::Running(handle);
            self.sweep_pending.store(false, Ordering::Release);
            debug!("Deferred TTL sweep task started");
        }
    }

    /// Returns the TTL applied to entries set without one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the sweep interval, zero when sweeping is disabled.
    pub fn cleanup_interval(&self) -> Duration {
        self.cleanup_interval
    }
}
