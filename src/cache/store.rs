//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with policy-driven eviction,
//! memory accounting and TTL expiration.
//!
//! The store is a single-owner structure: every mutation takes `&mut self`.
//! Share it through [`crate::CacheManager`], which serializes access with a
//! lock that the background sweep also honours.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::size::estimate_or_default;
use crate::cache::{
    CacheEntry, CacheEvent, CacheObserver, CacheStats, Clock, EntryMetadata, EventBus, JsonSize,
    SizeEstimator, StatsTracker, SystemClock, CLOCK_RESOLUTION,
};
use crate::config::{CacheConfig, CacheConfigUpdate};
use crate::error::Result;

// == Cache Store ==
/// Keyed entry collection with eviction, expiration and statistics.
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Active configuration epoch
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    estimator: Box<dyn SizeEstimator<V>>,
    /// Performance statistics
    stats: StatsTracker,
    /// Sum of `estimated_size` over `entries`
    memory_usage: usize,
    /// Logical time, bumped on every insert and successful read
    seq: u64,
    events: EventBus,
}

impl<V: Serialize> CacheStore<V> {
    // == Constructor ==
    /// Creates a store on the system clock, sizing values by their JSON length.
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_parts(config, Arc::new(SystemClock), Box::new(JsonSize))
    }
}

impl<V> CacheStore<V> {
    /// Creates a store with an explicit clock and size estimator.
    pub fn with_parts(
        config: CacheConfig,
        clock: Arc<dyn Clock>,
        estimator: Box<dyn SizeEstimator<V>>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            entries: HashMap::new(),
            config,
            clock,
            estimator,
            stats: StatsTracker::new(),
            memory_usage: 0,
            seq: 0,
            events: EventBus::new(),
        })
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    // == Set ==
    /// Stores a value under `key`, replacing any previous entry.
    ///
    /// If the store is at capacity, or the write would push memory usage over
    /// budget, entries are evicted in policy order until both ceilings hold.
    /// A `None` TTL means the configured default; an explicit TTL shorter
    /// than one millisecond is rounded up to it.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let started = Instant::now();
        let key = key.into();
        let ttl = ttl
            .unwrap_or(self.config.default_ttl)
            .max(CLOCK_RESOLUTION);
        let size = estimate_or_default(self.estimator.as_ref(), &key, &value);

        self.ensure_capacity(&key, size);

        let now = self.clock.now_ms();
        let seq = self.next_seq();
        let entry = CacheEntry::new(key.clone(), value, ttl, size, now, seq);
        if let Some(previous) = self.entries.insert(key.clone(), entry) {
            self.memory_usage -= previous.estimated_size;
        }
        self.memory_usage += size;

        self.stats.record_operation(started.elapsed());
        self.events.emit(CacheEvent::set(&key, size, ttl));
    }

    // == Get ==
    /// Retrieves a clone of the value stored under `key`.
    ///
    /// Missing and expired keys are both reported as `None`; an expired entry
    /// is removed on the way out.
    pub fn get(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let started = Instant::now();
        let now = self.clock.now_ms();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.stats.record_miss();
                self.stats.record_operation(started.elapsed());
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            debug!("Key '{}' expired on read", key);
            self.stats.record_miss();
            self.stats.record_operation(started.elapsed());
            return None;
        }

        let seq = self.next_seq();
        let entry = self.entries.get_mut(key)?;
        entry.record_access(now, seq);
        let value = entry.value.clone();
        let access_count = entry.access_count;

        self.stats.record_hit();
        self.stats.record_operation(started.elapsed());
        self.events.emit(CacheEvent::Get {
            key: key.to_string(),
            access_count,
        });
        Some(value)
    }

    // == Has ==
    /// Existence probe. Removes the entry if it has expired, but leaves
    /// access metadata and hit/miss counters alone.
    pub fn has(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => return false,
        };

        if expired {
            self.remove_entry(key);
        }
        !expired
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.remove_entry(key).is_none() {
            return false;
        }
        self.events.emit(CacheEvent::Delete {
            key: key.to_string(),
        });
        true
    }

    // == Clear ==
    /// Removes every entry, leaving statistics intact. Returns the count removed.
    pub fn clear(&mut self) -> usize {
        let cleared = self.entries.len();
        self.entries.clear();
        self.memory_usage = 0;
        self.events.emit(CacheEvent::Clear {
            cleared_entries: cleared,
        });
        cleared
    }

    // == Cleanup ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&mut self) -> usize {
        let now = self.clock.now_ms();
        self.purge_expired(now)
    }

    fn purge_expired(&mut self, now: u64) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }
        expired_keys.len()
    }

    // == Length ==
    /// Returns the current number of entries, including expired ones not yet
    /// swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Keys ==
    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        let mut keyed: Vec<(u64, &String)> = self
            .entries
            .values()
            .map(|entry| (entry.insert_seq, &entry.key))
            .collect();
        keyed.sort_unstable();
        keyed.into_iter().map(|(_, key)| key.clone()).collect()
    }

    // == Memory Usage ==
    /// Sum of estimated entry sizes in bytes.
    pub fn memory_usage(&self) -> usize {
        self.memory_usage
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len(), self.memory_usage)
    }

    /// Zeroes hit, miss, eviction and latency counters. Entries are untouched.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    // == Inspect ==
    /// Metadata for a live entry, without counting as an access.
    pub fn inspect(&self, key: &str) -> Option<EntryMetadata> {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.metadata(now))
    }

    // == Config ==
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Applies a partial configuration.
    ///
    /// An invalid update is rejected and the current epoch stays active. New
    /// ceilings and policies only take effect on the next write; nothing is
    /// evicted here.
    pub fn update_config(&mut self, update: &CacheConfigUpdate) -> Result<()> {
        self.config = self.config.merged(update)?;
        Ok(())
    }

    // == Subscribe ==
    /// Registers an observer for cache events.
    pub fn subscribe(&mut self, observer: Arc<dyn CacheObserver>) {
        self.events.subscribe(observer);
    }

    // == Capacity Enforcement ==
    fn breaches_ceilings(&self, incoming_key: &str, incoming_size: usize) -> bool {
        let replaced = self
            .entries
            .get(incoming_key)
            .map_or(0, |entry| entry.estimated_size);
        let memory_after = self.memory_usage.saturating_sub(replaced) + incoming_size;

        self.entries.len() >= self.config.max_entries || memory_after > self.config.max_memory_bytes
    }

    /// Makes room for an incoming entry in one combined pass.
    ///
    /// Dead entries go first and are not counted as evictions; live entries
    /// are then removed in policy order until both ceilings hold.
    fn ensure_capacity(&mut self, incoming_key: &str, incoming_size: usize) {
        if !self.breaches_ceilings(incoming_key, incoming_size) {
            return;
        }

        let now = self.clock.now_ms();
        let purged = self.purge_expired(now);
        if purged > 0 {
            debug!("Reclaimed {} expired entries before eviction", purged);
        }

        let policy = self.config.policy;
        // Any live entry may have to go; the walk stops once both ceilings hold
        let candidates = policy.select_for_eviction(self.entries.values(), self.entries.len());
        let mut evicted = 0;
        for key in candidates {
            if !self.breaches_ceilings(incoming_key, incoming_size) {
                break;
            }
            self.remove_entry(&key);
            self.stats.record_eviction();
            evicted += 1;
        }

        if incoming_size > self.config.max_memory_bytes {
            warn!(
                "Entry '{}' ({} bytes) exceeds the memory budget of {} bytes",
                incoming_key, incoming_size, self.config.max_memory_bytes
            );
        }

        if evicted > 0 {
            debug!("Evicted {} entries using {} policy", evicted, policy);
            self.events.emit(CacheEvent::Evicted {
                count: evicted,
                policy,
            });
        }
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.memory_usage -= entry.estimated_size;
        Some(entry)
    }
}

impl<V> std::fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.entries.len())
            .field("memory_usage", &self.memory_usage)
            .field("config", &self.config)
            .finish()
    }
}
