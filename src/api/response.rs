use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::external::{build_image_url, ImageSize};
use crate::models::Movie;

/// 统一的API响应包装器
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// 创建成功响应（带消息）
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// 辅助函数：创建成功响应
pub fn success<T: Serialize>(data: T) -> impl IntoResponse {
    ApiResponse::success(data)
}

/// 列表中展示的电影卡片
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MovieCard {
    pub id: u32,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    pub vote_average: f32,
    pub genre_ids: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop_url: Option<String>,
}

impl From<Movie> for MovieCard {
    fn from(movie: Movie) -> Self {
        let release_year = movie.release_year();
        Self {
            poster_url: build_image_url(movie.poster_path.as_deref(), ImageSize::W500),
            backdrop_url: build_image_url(movie.backdrop_path.as_deref(), ImageSize::W780),
            id: movie.id,
            title: movie.title,
            overview: movie.overview.filter(|o| !o.is_empty()),
            release_date: movie.release_date.filter(|d| !d.is_empty()),
            release_year,
            vote_average: movie.vote_average,
            genre_ids: movie.genre_ids,
        }
    }
}
