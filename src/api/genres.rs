use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use super::response::success;
use super::AppState;
use crate::external::genres::{split_advanced_genres, split_quick_genres};
use crate::models::Genre;
use crate::services::filter_codec::parse_comma_separated;

#[derive(Debug, Deserialize)]
pub struct GenreParams {
    /// 已选中的快速类型（逗号分隔）
    #[serde(default)]
    pub selected: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenreListing {
    pub quick: Vec<Genre>,
    pub advanced: Vec<Genre>,
    pub all: Vec<Genre>,
}

/// 类型列表，按快速 / 高级划分
pub async fn list_genres(
    State(state): State<AppState>,
    Query(params): Query<GenreParams>,
) -> ApiResult<impl IntoResponse> {
    let selected = params
        .selected
        .as_deref()
        .map(parse_comma_separated)
        .unwrap_or_default();

    let all = state.genres.genres().await?;
    Ok(success(GenreListing {
        quick: split_quick_genres(&all, &selected),
        advanced: split_advanced_genres(&all),
        all: all.as_ref().clone(),
    }))
}
