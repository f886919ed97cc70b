//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Shared;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// Each pass collects expired keys under the shared lock, then removes the
/// ones still expired under the exclusive lock.
///
/// The task exits when `shutdown` receives a value, when its sender is
/// dropped, or when the cache state it points to has been dropped.
///
/// # Arguments
/// * `runtime` - Runtime to spawn the task on
/// * `shared` - Weak reference to the cache state
/// * `interval` - Time to wait between passes
/// * `shutdown` - Receiver signalled by `Cache::close`
pub(crate) fn spawn_sweep_task<V>(
    runtime: &Handle,
    shared: Weak<Shared<V>>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    runtime.spawn(async move {
        info!(
            "Starting TTL sweep task with interval of {} ms",
            interval.as_millis()
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                // Err means the sender was dropped along with the cache
                _ = shutdown.changed() => break,
            }

            let Some(shared) = shared.upgrade() else {
                break;
            };
            let removed = shared.sweep().await;
            drop(shared);

            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }

        info!("TTL sweep task stopped");
    })
}
