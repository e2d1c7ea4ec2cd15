//! Cache Events Module
//!
//! Notifications fired synchronously after a mutation commits. Observers can
//! neither block nor fail the originating operation: errors and panics are
//! logged and dropped.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{duration_millis, EvictionPolicy};

// == Cache Event ==
/// Something that happened to the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum CacheEvent {
    #[serde(rename = "cache.set")]
    Set { key: String, size: usize, ttl_ms: u64 },
    #[serde(rename = "cache.get")]
    Get { key: String, access_count: u64 },
    #[serde(rename = "cache.delete")]
    Delete { key: String },
    #[serde(rename = "cache.clear")]
    Clear { cleared_entries: usize },
    #[serde(rename = "cache.evicted")]
    Evicted { count: usize, policy: EvictionPolicy },
}

impl CacheEvent {
    pub(crate) fn set(key: &str, size: usize, ttl: Duration) -> Self {
        CacheEvent::Set {
            key: key.to_string(),
            size,
            ttl_ms: duration_millis(ttl),
        }
    }

    /// Dotted event name, e.g. `cache.set`.
    pub fn name(&self) -> &'static str {
        match self {
            CacheEvent::Set { .. } => "cache.set",
            CacheEvent::Get { .. } => "cache.get",
            CacheEvent::Delete { .. } => "cache.delete",
            CacheEvent::Clear { .. } => "cache.clear",
            CacheEvent::Evicted { .. } => "cache.evicted",
        }
    }
}

// == Cache Observer ==
/// Receives cache events.
pub trait CacheObserver: Send + Sync {
    fn on_event(&self, event: &CacheEvent) -> anyhow::Result<()>;
}

impl<F> CacheObserver for F
where
    F: Fn(&CacheEvent) -> anyhow::Result<()> + Send + Sync,
{
    fn on_event(&self, event: &CacheEvent) -> anyhow::Result<()> {
        self(event)
    }
}

// == Tracing Observer ==
/// Logs every event at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CacheObserver for TracingObserver {
    fn on_event(&self, event: &CacheEvent) -> anyhow::Result<()> {
        debug!(event = event.name(), "{:?}", event);
        Ok(())
    }
}

// == Event Bus ==
/// Fan-out to registered observers.
#[derive(Default, Clone)]
pub struct EventBus {
    observers: Vec<Arc<dyn CacheObserver>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn CacheObserver>) {
        self.observers.push(observer);
    }

    /// Delivers `event` to every observer, swallowing failures.
    pub fn emit(&self, event: CacheEvent) {
        for observer in &self.observers {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| observer.on_event(&event)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!("Observer failed on {}: {:#}", event.name(), err);
                }
                Err(_) => {
                    warn!("Observer panicked on {}", event.name());
                }
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}
