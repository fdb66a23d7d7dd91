use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};
use super::response::{success, MovieCard};
use super::AppState;
use crate::models::Movie;
use crate::services::pagination::PageSnapshot;
use crate::services::search::{validate_search_query, SearchQuery};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// 规范化后的关键词
    pub query: String,
    pub enabled: bool,
    pub page: PageSnapshot<MovieCard>,
}

impl SearchResponse {
    fn new(query: &SearchQuery, page: PageSnapshot<Movie>) -> Self {
        Self {
            query: query.as_str().to_string(),
            enabled: query.is_enabled(),
            page: page.map(MovieCard::from),
        }
    }
}

/// 规范化关键词；启用的查询在清理后不能为空
fn resolve(params: &SearchParams) -> ApiResult<SearchQuery> {
    let query = SearchQuery::new(&params.q);
    if query.is_enabled() {
        validate_search_query(query.as_str())?;
    }
    Ok(query)
}

/// 搜索第一页；过短的关键词不请求目录 API
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<impl IntoResponse> {
    let query = resolve(&params)?;
    let page = state.search().activate(query.clone()).await;
    Ok(success(SearchResponse::new(&query, page)))
}

/// 加载搜索结果的下一页
pub async fn load_more(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<impl IntoResponse> {
    let query = resolve(&params)?;
    if !query.is_enabled() {
        return Err(ApiError::BadRequest(
            "Search query must be longer than one character".to_string(),
        ));
    }

    let orchestrator = state.search();
    orchestrator.resume(query.clone()).await;
    let page = orchestrator
        .load_more()
        .await
        .ok_or_else(|| ApiError::Internal("Search query was not activated".to_string()))?;
    Ok(success(SearchResponse::new(&query, page)))
}

/// 重新请求失败的搜索页
pub async fn retry(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<impl IntoResponse> {
    let query = resolve(&params)?;
    if !query.is_enabled() {
        return Err(ApiError::BadRequest(
            "Search query must be longer than one character".to_string(),
        ));
    }

    let orchestrator = state.search();
    orchestrator.resume(query.clone()).await;
    let page = orchestrator
        .retry()
        .await
        .ok_or_else(|| ApiError::Internal("Search query was not activated".to_string()))?;
    Ok(success(SearchResponse::new(&query, page)))
}
