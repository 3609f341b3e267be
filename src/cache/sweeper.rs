//! Background sweep of expired cache entries

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::storage::MemoryCache;

/// Handle to a repeating sweep task.
///
/// The task stops on [`Sweeper::stop`] or when the handle is dropped.
pub struct Sweeper {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Spawn a task that calls [`MemoryCache::sweep_expired`] every `interval`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<V>(cache: Arc<MemoryCache<V>>, interval: Duration) -> Self
    where
        V: Clone + Send + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let period = interval.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = cache.sweep_expired();
                        if removed > 0 {
                            log::debug!("Cache sweep removed {} expired entries", removed);
                        }
                    }
                    _ = &mut shutdown_rx => break,
                }
            }
            log::debug!("Cache sweeper stopped");
        });

        Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Stop the sweep task and wait for it to exit
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            log::warn!("Cache sweeper task failed: {}", e);
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
