//! Configuration Module
//!
//! Cache configuration epochs, partial updates, and loading the server
//! configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::{EvictionPolicy, CLOCK_RESOLUTION};
use crate::error::{CacheError, Result};

/// Default entry ceiling
pub const DEFAULT_MAX_ENTRIES: usize = 1000;
/// Default memory ceiling (50 MiB)
pub const DEFAULT_MAX_MEMORY_BYTES: usize = 50 * 1024 * 1024;
/// Default TTL applied when a write carries none (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
/// Default pause between background sweeps
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

// == Cache Config ==
/// One configuration epoch of a cache.
///
/// Durations serialize as whole milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Maximum sum of estimated entry sizes in bytes
    pub max_memory_bytes: usize,
    /// TTL for entries written without an explicit one
    #[serde(rename = "default_ttl_ms", with = "duration_ms")]
    pub default_ttl: Duration,
    /// Pause between background sweeps
    #[serde(rename = "cleanup_interval_ms", with = "duration_ms")]
    pub cleanup_interval: Duration,
    /// Eviction strategy
    pub policy: EvictionPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_memory_bytes: DEFAULT_MAX_MEMORY_BYTES,
            default_ttl: DEFAULT_TTL,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            policy: EvictionPolicy::default(),
        }
    }
}

impl CacheConfig {
    /// Default config with the given capacity and policy.
    pub fn with_policy(max_entries: usize, policy: EvictionPolicy) -> Self {
        Self {
            max_entries,
            policy,
            ..Self::default()
        }
    }

    pub fn lru(max_entries: usize) -> Self {
        Self::with_policy(max_entries, EvictionPolicy::Lru)
    }

    pub fn lfu(max_entries: usize) -> Self {
        Self::with_policy(max_entries, EvictionPolicy::Lfu)
    }

    /// Plain memoization cache: oldest write is dropped first.
    pub fn fifo(max_entries: usize) -> Self {
        Self::with_policy(max_entries, EvictionPolicy::Fifo)
    }

    pub fn ttl_ordered(max_entries: usize) -> Self {
        Self::with_policy(max_entries, EvictionPolicy::Ttl)
    }

    // == Validate ==
    /// Checks that every numeric field is positive. Durations must span at
    /// least one millisecond, the engine's time resolution.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(CacheError::InvalidConfig(
                "max_entries must be greater than 0".to_string(),
            ));
        }
        if self.max_memory_bytes == 0 {
            return Err(CacheError::InvalidConfig(
                "max_memory_bytes must be greater than 0".to_string(),
            ));
        }
        if self.default_ttl < CLOCK_RESOLUTION {
            return Err(CacheError::InvalidConfig(
                "default_ttl must be at least 1ms".to_string(),
            ));
        }
        if self.cleanup_interval < CLOCK_RESOLUTION {
            return Err(CacheError::InvalidConfig(
                "cleanup_interval must be at least 1ms".to_string(),
            ));
        }
        Ok(())
    }

    // == Merge ==
    /// Returns a validated copy with `update` applied, leaving `self` as is.
    pub fn merged(&self, update: &CacheConfigUpdate) -> Result<CacheConfig> {
        let next = CacheConfig {
            max_entries: update.max_entries.unwrap_or(self.max_entries),
            max_memory_bytes: update.max_memory_bytes.unwrap_or(self.max_memory_bytes),
            default_ttl: update.default_ttl.unwrap_or(self.default_ttl),
            cleanup_interval: update.cleanup_interval.unwrap_or(self.cleanup_interval),
            policy: update.policy.unwrap_or(self.policy),
        };
        next.validate()?;
        Ok(next)
    }
}

// == Cache Config Update ==
/// Partial configuration; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfigUpdate {
    pub max_entries: Option<usize>,
    pub max_memory_bytes: Option<usize>,
    pub default_ttl: Option<Duration>,
    pub cleanup_interval: Option<Duration>,
    pub policy: Option<EvictionPolicy>,
}

impl CacheConfigUpdate {
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    pub fn max_memory_bytes(mut self, max_memory_bytes: usize) -> Self {
        self.max_memory_bytes = Some(max_memory_bytes);
        self
    }

    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(interval);
        self
    }

    pub fn policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

// == Server Config ==
/// Settings for the HTTP server binary.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Cache settings
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Absent, unparsable or non-positive values fall back to the defaults;
    /// the latter two are logged.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `MAX_MEMORY_BYTES` - Memory ceiling in bytes (default: 50 MiB)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CLEANUP_INTERVAL_MS` - Sweep interval in milliseconds (default: 60000)
    /// - `EVICTION_POLICY` - One of lru, lfu, fifo, ttl (default: lru)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = CacheConfig::default();
        Self {
            cache: CacheConfig {
                max_entries: env_positive("MAX_ENTRIES").unwrap_or(defaults.max_entries),
                max_memory_bytes: env_positive("MAX_MEMORY_BYTES")
                    .unwrap_or(defaults.max_memory_bytes),
                default_ttl: env_positive("DEFAULT_TTL_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.default_ttl),
                cleanup_interval: env_positive("CLEANUP_INTERVAL_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.cleanup_interval),
                policy: env_parse("EVICTION_POLICY").unwrap_or(defaults.policy),
            },
            server_port: env_parse("SERVER_PORT").unwrap_or(3000),
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value, using the default", name, raw);
            None
        }
    }
}

fn env_positive<T: FromStr + Default + PartialEq>(name: &str) -> Option<T> {
    env_parse(name).filter(|value: &T| {
        let positive = *value != T::default();
        if !positive {
            warn!("Ignoring {}: must be greater than 0, using the default", name);
        }
        positive
    })
}

// == Duration Serde ==
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::cache::duration_millis;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration_millis(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
