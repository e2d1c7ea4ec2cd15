//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and
//! operation latency. Rates are derived on read so they always reflect the
//! current counters.

use std::time::Duration;

use serde::Serialize;

// == Stats Tracker ==
/// Mutable counters owned by the store.
#[derive(Debug, Clone, Default)]
pub struct StatsTracker {
    hits: u64,
    misses: u64,
    evictions: u64,
    total_op_time: Duration,
    timed_ops: u64,
}

impl StatsTracker {
    // == Constructor ==
    /// Creates a new tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Operation ==
    /// Adds one timed operation to the latency accumulator.
    pub fn record_operation(&mut self, elapsed: Duration) {
        self.total_op_time += elapsed;
        self.timed_ops += 1;
    }

    // == Reset ==
    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Miss Rate ==
    /// Returns misses / (hits + misses), or 0.0 if no requests have been made.
    pub fn miss_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.misses as f64 / total as f64
        }
    }

    // == Average Access Time ==
    /// Mean latency of timed operations in milliseconds.
    pub fn average_access_time_ms(&self) -> f64 {
        if self.timed_ops == 0 {
            0.0
        } else {
            self.total_op_time.as_secs_f64() * 1000.0 / self.timed_ops as f64
        }
    }

    // == Snapshot ==
    /// Builds a read-only snapshot, combining counters with the store's size.
    pub fn snapshot(&self, total_entries: usize, total_bytes: usize) -> CacheStats {
        CacheStats {
            total_entries,
            total_bytes,
            hits: self.hits,
            misses: self.misses,
            hit_rate: self.hit_rate(),
            miss_rate: self.miss_rate(),
            eviction_count: self.evictions,
            average_access_time_ms: self.average_access_time_ms(),
        }
    }
}

// == Cache Stats ==
/// Point-in-time view of cache performance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Sum of estimated entry sizes in bytes
    pub total_bytes: usize,
    /// Number of successful retrievals
    pub hits: u64,
    /// Number of failed retrievals (key not found or expired)
    pub misses: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
    /// Entries evicted to satisfy capacity or memory ceilings
    pub eviction_count: u64,
    pub average_access_time_ms: f64,
}
