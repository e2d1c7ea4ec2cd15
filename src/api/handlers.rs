//! API Handlers
//!
//! HTTP request handlers for each admin endpoint. Every handler is a thin
//! wrapper over one [`CacheManager`] operation.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::EntryMetadata;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::manager::CacheManager;
use crate::models::{
    CleanupResponse, ClearResponse, ConfigUpdateRequest, DeleteResponse, GetResponse, HasResponse,
    HealthResponse, KeysResponse, MessageResponse, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache handle holding arbitrary JSON values
    pub cache: CacheManager<Value>,
}

impl AppState {
    /// Creates a new AppState around an existing manager.
    pub fn new(cache: CacheManager<Value>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Starts the manager's cleanup task, so this must run inside a tokio
    /// runtime.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Ok(Self::new(CacheManager::new(config.clone())?))
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl();
    state.cache.set(req.key.clone(), req.value, ttl).await;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .cache
        .get(&key)
        .await
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for GET /has/:key
pub async fn has_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<HasResponse> {
    let exists = state.cache.has(&key).await;
    Json(HasResponse { key, exists })
}

/// Handler for GET /entry/:key
pub async fn entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<EntryMetadata>> {
    state
        .cache
        .inspect(&key)
        .await
        .map(Json)
        .ok_or(CacheError::NotFound(key))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.delete(&key).await {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /keys
pub async fn keys_handler(State(state): State<AppState>) -> Json<KeysResponse> {
    Json(KeysResponse::new(state.cache.keys().await))
}

/// Handler for POST /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.cache.clear().await;
    Json(ClearResponse { cleared })
}

/// Handler for POST /cleanup
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<CleanupResponse> {
    let removed = state.cache.cleanup().await;
    Json(CleanupResponse { removed })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    let config = state.cache.config().await;

    Json(StatsResponse::new(stats, &config))
}

/// Handler for POST /stats/reset
pub async fn reset_stats_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache.reset_stats().await;
    Json(MessageResponse::new("Statistics reset"))
}

/// Handler for GET /config
pub async fn get_config_handler(State(state): State<AppState>) -> Json<CacheConfig> {
    Json(state.cache.config().await)
}

/// Handler for PATCH /config
///
/// Returns the configuration now in effect.
pub async fn update_config_handler(
    State(state): State<AppState>,
    Json(req): Json<ConfigUpdateRequest>,
) -> Result<Json<CacheConfig>> {
    let update = req.into_update()?;
    state.cache.update_config(update).await?;

    Ok(Json(state.cache.config().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> AppState {
        AppState::from_config(&CacheConfig::lru(100)).unwrap()
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = state();

        let req = SetRequest {
            key: "test_key".to_string(),
            value: json!({"rendered": "<svg/>"}),
            ttl_ms: None,
        };
        let result = set_handler(State(state.clone()), Json(req)).await;
        assert!(result.is_ok());

        let response = get_handler(State(state.clone()), Path("test_key".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, json!({"rendered": "<svg/>"}));

        state.cache.dispose().await;
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = state();

        let result = get_handler(State(state.clone()), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));

        state.cache.dispose().await;
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = state();

        let req = SetRequest {
            key: "to_delete".to_string(),
            value: json!("value"),
            ttl_ms: None,
        };
        set_handler(State(state.clone()), Json(req)).await.unwrap();

        let result = delete_handler(State(state.clone()), Path("to_delete".to_string())).await;
        assert!(result.is_ok());

        let result = delete_handler(State(state.clone()), Path("to_delete".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));

        state.cache.dispose().await;
    }

    #[tokio::test]
    async fn test_has_does_not_count_as_lookup() {
        let state = state();
        state.cache.set("k", json!(1), None).await;

        let response = has_handler(State(state.clone()), Path("k".to_string())).await;
        assert!(response.exists);

        let stats = stats_handler(State(state.clone())).await;
        assert_eq!(stats.stats.hits, 0);
        assert_eq!(stats.stats.misses, 0);

        state.cache.dispose().await;
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = state();

        let response = stats_handler(State(state.clone())).await;
        assert_eq!(response.stats.hits, 0);
        assert_eq!(response.stats.misses, 0);
        assert_eq!(response.max_entries, 100);

        state.cache.dispose().await;
    }

    #[tokio::test]
    async fn test_update_config_handler_rejects_invalid() {
        let state = state();

        let req = ConfigUpdateRequest {
            max_entries: Some(0),
            ..Default::default()
        };
        let result = update_config_handler(State(state.clone()), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
        assert_eq!(state.cache.config().await.max_entries, 100);

        state.cache.dispose().await;
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let state = state();

        let req = SetRequest {
            key: "k".to_string(),
            value: json!("value"),
            ttl_ms: Some(0),
        };
        let result = set_handler(State(state.clone()), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));

        state.cache.dispose().await;
    }
}
