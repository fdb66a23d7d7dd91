use axum::{
    extract::{Path, RawQuery, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};
use super::response::{success, MovieCard};
use super::AppState;
use crate::models::{
    DiscoverParams, FilterState, FilterUpdate, Movie, ParamValidator, UrlFilterParams,
};
use crate::services::filter_merger::{coming_soon_params, trending_params};
use crate::services::filter_store::FilterStore;
use crate::services::pagination::{CacheKey, PageQuery, PageSnapshot};

/// 发现页响应
#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    /// 规范化的筛选查询字符串
    pub query: String,
    pub filters: FilterState,
    pub active_filter_count: usize,
    pub params: DiscoverParams,
    pub page: PageSnapshot<MovieCard>,
}

impl DiscoverResponse {
    fn new(filters: FilterState, params: DiscoverParams, page: PageSnapshot<Movie>) -> Self {
        Self {
            query: FilterStore::from_filter_state(&filters).query_string(),
            active_filter_count: filters.active_filter_count(),
            filters,
            params,
            page: page.map(MovieCard::from),
        }
    }
}

/// 从请求的查询字符串解析筛选并得到已校验的 discover 参数
fn resolve(state: &AppState, raw: Option<String>) -> ApiResult<(FilterState, DiscoverParams)> {
    let store = FilterStore::from_query_string(raw.as_deref().unwrap_or_default());
    let params = ParamValidator::validate(store.discover_params(state.clock.as_ref()))?;
    Ok((store.filter_state(), params))
}

/// 发现页第一页（命中新鲜缓存时直接返回已累积的结果）
pub async fn discover(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<impl IntoResponse> {
    let (filters, params) = resolve(&state, raw)?;
    let page = state.discovery().activate(params.clone()).await;
    Ok(success(DiscoverResponse::new(filters, params, page)))
}

/// 加载下一页
pub async fn load_more(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<impl IntoResponse> {
    let (filters, params) = resolve(&state, raw)?;
    let orchestrator = state.discovery();
    orchestrator.resume(params.clone()).await;
    let page = orchestrator
        .load_more()
        .await
        .ok_or_else(|| ApiError::Internal("Discovery query was not activated".to_string()))?;
    Ok(success(DiscoverResponse::new(filters, params, page)))
}

/// 重新请求失败的那一页
pub async fn retry(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<impl IntoResponse> {
    let (filters, params) = resolve(&state, raw)?;
    let orchestrator = state.discovery();
    orchestrator.resume(params.clone()).await;
    let page = orchestrator
        .retry()
        .await
        .ok_or_else(|| ApiError::Internal("Discovery query was not activated".to_string()))?;
    Ok(success(DiscoverResponse::new(filters, params, page)))
}

/// 参数推导结果（不请求目录 API）
#[derive(Debug, Serialize)]
pub struct DerivedParams {
    pub query: String,
    pub url_params: UrlFilterParams,
    pub filters: FilterState,
    pub active_filter_count: usize,
    pub params: DiscoverParams,
    pub cache_key: CacheKey,
    /// 已选类型的名称（类型列表不可用时为空）
    pub genre_names: Vec<String>,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ValidationIssue>,
}

#[derive(Debug, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
}

/// 展示 URL → 筛选状态 → discover 参数 → 缓存键 的完整推导
pub async fn derive_params(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> impl IntoResponse {
    let store = FilterStore::from_query_string(raw.as_deref().unwrap_or_default());
    let filters = store.filter_state();
    let merged = store.discover_params(state.clock.as_ref());

    let (params, error) = match ParamValidator::validate(merged.clone()) {
        Ok(params) => (params, None),
        Err(e) => (
            merged,
            Some(ValidationIssue {
                field: e.field(),
                message: e.to_string(),
            }),
        ),
    };

    let selected: Vec<u32> = filters
        .quick_genres
        .iter()
        .chain(filters.advanced_genres.iter())
        .copied()
        .collect();
    let genre_names = match state.genres.names(&selected).await {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!("Genre names unavailable: {}", e);
            Vec::new()
        }
    };

    success(DerivedParams {
        query: FilterStore::from_filter_state(&filters).query_string(),
        url_params: store.url_params(),
        active_filter_count: filters.active_filter_count(),
        filters,
        cache_key: params.cache_key(),
        genre_names,
        valid: error.is_none(),
        params,
        error,
    })
}

#[derive(Debug, Serialize)]
pub struct ValidatedParams {
    pub params: DiscoverParams,
    pub cache_key: CacheKey,
}

/// 校验一组 discover 参数
pub async fn validate_params(
    Json(params): Json<DiscoverParams>,
) -> ApiResult<impl IntoResponse> {
    let params = ParamValidator::validate(params)?;
    Ok(success(ValidatedParams {
        cache_key: params.cache_key(),
        params,
    }))
}

/// 筛选更新请求：在给定查询字符串上应用一次更新或重置
#[derive(Debug, Deserialize)]
pub struct FilterUpdateRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub update: Option<FilterUpdate>,
    #[serde(default)]
    pub reset: bool,
}

#[derive(Debug, Serialize)]
pub struct FilterUpdateResponse {
    /// 更新后的完整查询字符串（保留无关参数）
    pub query: String,
    pub filters: FilterState,
    pub active_filter_count: usize,
    pub params: DiscoverParams,
}

/// 应用筛选更新并返回新的查询字符串
pub async fn update_filters(
    State(state): State<AppState>,
    Json(request): Json<FilterUpdateRequest>,
) -> impl IntoResponse {
    let mut store = FilterStore::from_query_string(&request.query);
    if request.reset {
        store.reset_filters();
    }
    if let Some(update) = request.update {
        store.update_filter(update);
    }

    let filters = store.filter_state();
    success(FilterUpdateResponse {
        query: store.query_string(),
        active_filter_count: filters.active_filter_count(),
        params: store.discover_params(state.clock.as_ref()),
        filters,
    })
}

#[derive(Debug, Serialize)]
pub struct SectionResponse {
    pub section: String,
    pub params: DiscoverParams,
    pub page: PageSnapshot<MovieCard>,
}

/// 预设分区：trending / coming-soon
pub async fn section(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let params = match section.as_str() {
        "trending" => trending_params(),
        "coming-soon" => coming_soon_params(state.clock.as_ref()),
        other => return Err(ApiError::NotFound(format!("Unknown section: {}", other))),
    };

    let page = state.discovery().activate(params.clone()).await;
    Ok(success(SectionResponse {
        section,
        params,
        page: page.map(MovieCard::from),
    }))
}
