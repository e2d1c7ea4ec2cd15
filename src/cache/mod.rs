//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, memory budgeting and
//! pluggable eviction (LRU, LFU, FIFO, TTL-order).

mod clock;
mod entry;
mod events;
mod policy;
mod size;
mod stats;
mod store;


// Re-export public types
pub use clock::{duration_millis, Clock, ManualClock, SystemClock, CLOCK_RESOLUTION};
pub use entry::{CacheEntry, EntryMetadata};
pub use events::{CacheEvent, CacheObserver, EventBus, TracingObserver};
pub use policy::EvictionPolicy;
pub use size::{FixedSize, JsonSize, SizeEstimator, DEFAULT_ENTRY_SIZE};
pub use stats::{CacheStats, StatsTracker};
pub use store::CacheStore;
