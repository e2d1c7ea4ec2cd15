//! Request DTOs for the cache admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::cache::EvictionPolicy;
use crate::config::CacheConfigUpdate;
use crate::error::{CacheError, Result};

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under (may be empty)
/// - `value`: Any JSON value
/// - `ttl_ms`: Optional TTL in milliseconds (uses the configured default if absent)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.ttl_ms == Some(0) {
            return Some("ttl_ms must be greater than 0".to_string());
        }
        None
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(Duration::from_millis)
    }
}

/// Request body for PATCH /config
///
/// Every field is optional; absent fields keep their current value. The
/// policy is taken as free text so unknown names surface as a configuration
/// error rather than a body parsing failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigUpdateRequest {
    pub max_entries: Option<usize>,
    pub max_memory_bytes: Option<usize>,
    pub default_ttl_ms: Option<u64>,
    pub cleanup_interval_ms: Option<u64>,
    pub policy: Option<String>,
}

impl ConfigUpdateRequest {
    /// Converts into a typed update, rejecting unknown policies.
    pub fn into_update(self) -> Result<CacheConfigUpdate> {
        let policy = self
            .policy
            .as_deref()
            .map(str::parse::<EvictionPolicy>)
            .transpose()?;

        Ok(CacheConfigUpdate {
            max_entries: self.max_entries,
            max_memory_bytes: self.max_memory_bytes,
            default_ttl: self.default_ttl_ms.map(Duration::from_millis),
            cleanup_interval: self.cleanup_interval_ms.map(Duration::from_millis),
            policy,
        })
    }
}

impl TryFrom<ConfigUpdateRequest> for CacheConfigUpdate {
    type Error = CacheError;

    fn try_from(req: ConfigUpdateRequest) -> Result<Self> {
        req.into_update()
    }
}
