//! Cache Manager
//!
//! The shareable handle over a [`CacheStore`]: it owns the lock that
//! serializes foreground operations and the background sweep, and the
//! scheduler lifecycle tied to the active configuration.
//!
//! Build one at the application root and hand clones to collaborators; there
//! is no global instance.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::cache::{CacheObserver, CacheStats, CacheStore, EntryMetadata};
use crate::config::{CacheConfig, CacheConfigUpdate};
use crate::error::Result;
use crate::tasks::CleanupScheduler;

// == Cache Manager ==
/// Thread-safe cache handle with a background TTL sweep.
pub struct CacheManager<V> {
    store: Arc<RwLock<CacheStore<V>>>,
    /// `None` once disposed
    scheduler: Arc<Mutex<Option<CleanupScheduler>>>,
}

impl<V> Clone for CacheManager<V> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<V> CacheManager<V>
where
    V: Serialize + Send + Sync + 'static,
{
    /// Creates a manager on the system clock with JSON size estimation and
    /// starts its cleanup task. Must be called inside a tokio runtime.
    pub fn new(config: CacheConfig) -> Result<Self> {
        Ok(Self::from_store(CacheStore::new(config)?))
    }
}

impl<V> CacheManager<V>
where
    V: Send + Sync + 'static,
{
    /// Wraps an existing store and starts its cleanup task.
    pub fn from_store(store: CacheStore<V>) -> Self {
        let interval = store.config().cleanup_interval;
        let store = Arc::new(RwLock::new(store));
        let scheduler = CleanupScheduler::start(store.clone(), interval);

        Self {
            store,
            scheduler: Arc::new(Mutex::new(Some(scheduler))),
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        self.store.write().await.set(key, value, ttl);
    }

    pub async fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        self.store.write().await.get(key)
    }

    pub async fn has(&self, key: &str) -> bool {
        self.store.write().await.has(key)
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    pub async fn clear(&self) -> usize {
        self.store.write().await.clear()
    }

    /// Eager sweep of expired entries, independent of the scheduler.
    pub async fn cleanup(&self) -> usize {
        self.store.write().await.cleanup()
    }

    pub async fn size(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.store.read().await.keys()
    }

    pub async fn memory_usage(&self) -> usize {
        self.store.read().await.memory_usage()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    pub async fn reset_stats(&self) {
        self.store.write().await.reset_stats();
    }

    pub async fn inspect(&self, key: &str) -> Option<EntryMetadata> {
        self.store.read().await.inspect(key)
    }

    pub async fn subscribe(&self, observer: Arc<dyn CacheObserver>) {
        self.store.write().await.subscribe(observer);
    }

    pub async fn config(&self) -> CacheConfig {
        self.store.read().await.config().clone()
    }

    // == Update Config ==
    /// Merges `update` into the active configuration.
    ///
    /// Invalid updates are rejected with nothing changed. When the cleanup
    /// interval changes the scheduler is restarted while its slot stays
    /// locked, so concurrent updates or disposal never observe zero or two
    /// running tasks. A disposed manager is not restarted.
    pub async fn update_config(&self, update: CacheConfigUpdate) -> Result<()> {
        let mut scheduler = self.scheduler.lock().await;

        let interval = {
            let mut store = self.store.write().await;
            store.update_config(&update)?;
            store.config().cleanup_interval
        };

        // The store lock must be released here: stopping waits on a sweep
        // that may be queued behind it.
        if let Some(current) = scheduler.as_mut() {
            let previous = current.interval();
            if previous != interval {
                current.stop().await;
                *scheduler = Some(CleanupScheduler::start(self.store.clone(), interval));
                info!("Cleanup interval changed from {:?} to {:?}", previous, interval);
            }
        }

        Ok(())
    }

    /// Whether the background sweep is currently running.
    pub async fn is_scheduler_running(&self) -> bool {
        self.scheduler
            .lock()
            .await
            .as_ref()
            .is_some_and(CleanupScheduler::is_running)
    }

    // == Dispose ==
    /// Stops the scheduler and clears the store. Idempotent.
    ///
    /// The handle stays usable afterwards, but expired entries are then only
    /// removed lazily or by explicit `cleanup` calls.
    pub async fn dispose(&self) {
        let mut slot = self.scheduler.lock().await;
        let Some(mut scheduler) = slot.take() else {
            return;
        };
        scheduler.stop().await;

        let cleared = self.store.write().await.clear();
        info!("Cache disposed, {} entries cleared", cleared);
    }
}
