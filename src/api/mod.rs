pub mod discover;
pub mod error;
pub mod genres;
pub mod health;
pub mod response;
pub mod search;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::config::DiscoveryConfig;
use crate::external::{Catalog, GenreCatalog};
use crate::models::{DiscoverParams, Movie};
use crate::services::pagination::{CacheCleanupTask, Expiring, PaginationOrchestrator, QueryCache};
use crate::services::search::SearchQuery;
use crate::services::trend::Clock;

/// 共享的应用状态
///
/// 查询缓存在所有请求之间共享；每个请求使用自己的编排器视图
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub genres: GenreCatalog,
    pub discovery_cache: QueryCache<DiscoverParams, Movie>,
    pub search_cache: QueryCache<SearchQuery, Movie>,
    pub clock: Arc<dyn Clock>,
    pub catalog_configured: bool,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        config: &DiscoveryConfig,
        clock: Arc<dyn Clock>,
        catalog_configured: bool,
    ) -> Self {
        Self {
            genres: GenreCatalog::new(Arc::clone(&catalog), config.genre_ttl()),
            discovery_cache: QueryCache::new(config.discovery_policy()),
            search_cache: QueryCache::new(config.search_policy()),
            catalog,
            clock,
            catalog_configured,
        }
    }

    pub fn discovery(&self) -> PaginationOrchestrator<DiscoverParams, dyn Catalog> {
        PaginationOrchestrator::new(Arc::clone(&self.catalog), self.discovery_cache.clone())
    }

    pub fn search(&self) -> PaginationOrchestrator<SearchQuery, dyn Catalog> {
        PaginationOrchestrator::new(Arc::clone(&self.catalog), self.search_cache.clone())
    }

    /// 定期清理两类查询缓存的任务
    pub fn cleanup_task(&self, config: &DiscoveryConfig) -> CacheCleanupTask {
        let discovery: Arc<dyn Expiring> = Arc::new(self.discovery_cache.clone());
        let search: Arc<dyn Expiring> = Arc::new(self.search_cache.clone());
        CacheCleanupTask::new(vec![discovery, search], config.cleanup_interval())
    }
}

/// 构建路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Movie Discovery Backend API v1.0" }))
        // Health and cache
        .route("/api/health", get(health::health_check))
        .route("/api/cache/cleanup", post(health::cleanup_cache))
        .route("/api/cache/clear", post(health::clear_cache))
        // Discovery
        .route("/api/discover", get(discover::discover))
        .route("/api/discover/more", post(discover::load_more))
        .route("/api/discover/retry", post(discover::retry))
        .route("/api/discover/params", get(discover::derive_params))
        .route("/api/discover/params/validate", post(discover::validate_params))
        .route("/api/discover/filters", post(discover::update_filters))
        .route("/api/discover/sections/:section", get(discover::section))
        // Search
        .route("/api/search", get(search::search))
        .route("/api/search/more", post(search::load_more))
        .route("/api/search/retry", post(search::retry))
        // Genres
        .route("/api/genres", get(genres::list_genres))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
