//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support and
//! the access metadata eviction policies rank on.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::cache::duration_millis;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Key under which the entry is stored
    pub key: String,
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Lifetime measured from `created_at`
    pub ttl: Duration,
    /// Number of successful reads
    pub access_count: u64,
    /// Last successful read (Unix milliseconds), `created_at` until then
    pub last_accessed_at: u64,
    /// Approximate size in bytes, fixed at insertion
    pub estimated_size: usize,
    /// Store-wide sequence number at insertion
    pub insert_seq: u64,
    /// Store-wide sequence number at the last read, `insert_seq` until then
    pub access_seq: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped at `now_ms`.
    pub fn new(
        key: String,
        value: V,
        ttl: Duration,
        estimated_size: usize,
        now_ms: u64,
        seq: u64,
    ) -> Self {
        Self {
            key,
            value,
            created_at: now_ms,
            ttl,
            access_count: 0,
            last_accessed_at: now_ms,
            estimated_size,
            insert_seq: seq,
            access_seq: seq,
        }
    }

    // == Expires At ==
    /// Absolute expiration timestamp (Unix milliseconds).
    pub fn expires_at(&self) -> u64 {
        self.created_at.saturating_add(duration_millis(self.ttl))
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// Boundary condition: the entry is expired once the full TTL has elapsed,
    /// i.e. when `now_ms >= created_at + ttl`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at()
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at().saturating_sub(now_ms)
    }

    // == Record Access ==
    /// Updates access metadata after a successful read.
    ///
    /// `last_accessed_at` never moves behind `created_at`, even if the clock
    /// steps backwards.
    pub fn record_access(&mut self, now_ms: u64, seq: u64) {
        self.access_count += 1;
        self.last_accessed_at = now_ms.max(self.created_at);
        self.access_seq = seq;
    }

    // == Metadata ==
    /// Read-only view of the entry's bookkeeping.
    pub fn metadata(&self, now_ms: u64) -> EntryMetadata {
        EntryMetadata {
            key: self.key.clone(),
            created_at: millis_to_datetime(self.created_at),
            last_accessed_at: millis_to_datetime(self.last_accessed_at),
            access_count: self.access_count,
            estimated_size: self.estimated_size,
            ttl_ms: duration_millis(self.ttl),
            ttl_remaining_ms: self.ttl_remaining_ms(now_ms),
        }
    }
}

// == Entry Metadata ==
/// Snapshot of an entry's metadata, without its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryMetadata {
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: u64,
    pub estimated_size: usize,
    pub ttl_ms: u64,
    pub ttl_remaining_ms: u64,
}

fn millis_to_datetime(ms: u64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms as i64)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
