//! Cache Engine - An in-memory cache with TTL expiration and pluggable eviction
//!
//! Provides a keyed store with entry and memory ceilings, four eviction
//! policies (LRU, LFU, FIFO, TTL-order), live hit/miss/latency statistics and
//! a background task that sweeps expired entries.
//!
//! ```ignore
//! let cache: CacheManager<String> = CacheManager::new(CacheConfig::lru(100))?;
//! cache.set("greeting", "hello".to_string(), None).await;
//! assert_eq!(cache.get("greeting").await, Some("hello".to_string()));
//! cache.dispose().await;
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod manager;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStats, CacheStore, EvictionPolicy};
pub use config::{CacheConfig, CacheConfigUpdate, ServerConfig};
pub use error::CacheError;
pub use manager::CacheManager;
pub use tasks::CleanupScheduler;
