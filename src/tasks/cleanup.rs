//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.
//!
//! The sweep is purely additive: lazy expiration in `get`/`has` already hides
//! dead entries from callers, the task only bounds how long they keep holding
//! memory.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task runs in an infinite loop, sleeping for `interval` between runs.
/// Each run takes the store's write lock, the same lock foreground writers
/// use, so a sweep never interleaves with a `set`. A panic inside one sweep
/// is logged and the loop carries on.
///
/// # Returns
/// A JoinHandle for the spawned task. Prefer [`CleanupScheduler`], which
/// also waits for the task to wind down when stopped.
pub fn spawn_cleanup_task<V>(cache: Arc<RwLock<CacheStore<V>>>, interval: Duration) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!("Starting TTL cleanup task with interval of {:?}", interval);

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            let outcome = {
                let mut cache_guard = cache.write().await;
                panic::catch_unwind(AssertUnwindSafe(|| cache_guard.cleanup()))
            };

            // Log cleanup statistics
            match outcome {
                Ok(0) => debug!("TTL cleanup: no expired entries found"),
                Ok(removed) => info!("TTL cleanup: removed {} expired entries", removed),
                Err(_) => error!("TTL cleanup panicked; retrying on the next tick"),
            }
        }
    })
}

// == Cleanup Scheduler ==
/// Owns the running cleanup task.
///
/// Dropping the scheduler aborts the task; [`CleanupScheduler::stop`] also
/// waits for it, so no sweep runs after it returns.
#[derive(Debug)]
pub struct CleanupScheduler {
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl CleanupScheduler {
    /// Starts sweeping `cache` every `interval`. Must be called inside a
    /// tokio runtime.
    pub fn start<V>(cache: Arc<RwLock<CacheStore<V>>>, interval: Duration) -> Self
    where
        V: Send + Sync + 'static,
    {
        Self {
            handle: Some(spawn_cleanup_task(cache, interval)),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Cancels the task and waits until it has finished. Idempotent.
    pub async fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            // Cancellation is the expected outcome
            let _ = handle.await;
            info!("TTL cleanup task stopped");
        }
    }
}

impl Drop for CleanupScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Clock, JsonSize, ManualClock};
    use crate::config::CacheConfig;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    fn shared_store(clock: Arc<dyn Clock>) -> Arc<RwLock<CacheStore<String>>> {
        let store = CacheStore::with_parts(CacheConfig::default(), clock, Box::new(JsonSize)).unwrap();
        Arc::new(RwLock::new(store))
    }

    /// Panics on the first reading after being armed.
    #[derive(Debug, Default)]
    struct FlakyClock {
        armed: AtomicBool,
        readings: AtomicU32,
    }

    impl Clock for FlakyClock {
        fn now_ms(&self) -> u64 {
            self.readings.fetch_add(1, Ordering::SeqCst);
            if self.armed.swap(false, Ordering::SeqCst) {
                panic!("clock failure");
            }
            0
        }
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let clock = ManualClock::new(0);
        let cache = shared_store(Arc::new(clock.clone()));

        cache
            .write()
            .await
            .set("expire_soon", "value".to_string(), Some(Duration::from_secs(1)));
        clock.advance(Duration::from_secs(2));

        let mut scheduler = CleanupScheduler::start(cache.clone(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(80)).await;

        // Removed without any lookup touching the key
        assert_eq!(cache.read().await.len(), 0);

        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let clock = ManualClock::new(0);
        let cache = shared_store(Arc::new(clock.clone()));

        cache
            .write()
            .await
            .set("long_lived", "value".to_string(), Some(Duration::from_secs(3600)));

        let mut scheduler = CleanupScheduler::start(cache.clone(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(
            cache.write().await.get("long_lived"),
            Some("value".to_string())
        );

        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let cache = shared_store(Arc::new(ManualClock::new(0)));

        let mut scheduler = CleanupScheduler::start(cache, Duration::from_millis(10));
        assert!(scheduler.is_running());

        scheduler.stop().await;
        assert!(!scheduler.is_running());

        scheduler.stop().await;
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn test_no_sweep_after_stop() {
        let clock = ManualClock::new(0);
        let cache = shared_store(Arc::new(clock.clone()));

        let mut scheduler = CleanupScheduler::start(cache.clone(), Duration::from_millis(5));
        scheduler.stop().await;

        cache
            .write()
            .await
            .set("dead", "value".to_string(), Some(Duration::from_millis(1)));
        clock.advance(Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(cache.read().await.len(), 1, "expired entry left for lazy removal");
    }

    #[tokio::test]
    async fn test_sweep_panic_does_not_kill_loop() {
        let clock = Arc::new(FlakyClock::default());
        let cache = shared_store(clock.clone());

        clock.armed.store(true, Ordering::SeqCst);
        let mut scheduler = CleanupScheduler::start(cache, Duration::from_millis(5));

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(scheduler.is_running(), "loop should survive a failed sweep");
        assert!(clock.readings.load(Ordering::SeqCst) >= 2);

        scheduler.stop().await;
    }
}
