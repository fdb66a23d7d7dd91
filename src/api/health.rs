use axum::{extract::State, response::IntoResponse};
use serde_json::json;

use super::response::{success, ApiResponse};
use super::AppState;

/// 健康检查端点
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let tmdb_status = if state.catalog_configured {
        "available"
    } else {
        "not_configured"
    };

    success(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "tmdb_api": tmdb_status,
        "query_cache": {
            "discovery": state.discovery_cache.stats(),
            "search": state.search_cache.stats(),
        }
    }))
}

/// 清理过期的查询缓存
pub async fn cleanup_cache(State(state): State<AppState>) -> impl IntoResponse {
    let evicted = state.discovery_cache.cleanup_expired() + state.search_cache.cleanup_expired();
    tracing::info!("Manual cache cleanup evicted {} entries", evicted);

    success(json!({
        "message": "Cache cleanup completed",
        "evicted": evicted,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// 清空所有缓存（包括类型列表）
pub async fn clear_cache(State(state): State<AppState>) -> impl IntoResponse {
    state.discovery_cache.clear();
    state.search_cache.clear();
    state.genres.invalidate();
    tracing::info!("All caches cleared");

    ApiResponse::success_with_message(
        json!({ "timestamp": chrono::Utc::now().to_rfc3339() }),
        "All caches cleared",
    )
}
