use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::external::{CatalogError, CatalogErrorKind};
use crate::models::ValidationError;

/// 校验失败时返回给客户端的文案；具体原因只写入日志
pub const VALIDATION_MESSAGE: &str =
    "Some filter values are not valid - adjust the filters and try again.";

/// 统一的API错误类型
#[derive(Debug)]
pub enum ApiError {
    /// 未找到资源
    NotFound(String),
    /// 验证错误（带出错字段）
    Validation {
        field: &'static str,
        message: String,
    },
    /// 请求参数错误
    BadRequest(String),
    /// 目录 API 限流
    RateLimited(String),
    /// 外部服务错误
    ExternalService(String),
    /// 内部服务器错误
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Validation { field, message } => {
                write!(f, "Validation error on {}: {}", field, message)
            }
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::RateLimited(msg) => write!(f, "Rate limited: {}", msg),
            ApiError::ExternalService(msg) => write!(f, "External service error: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// 从ValidationError转换
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        tracing::warn!("Rejected parameters on {}: {}", err.field(), err);
        ApiError::Validation {
            field: err.field(),
            message: VALIDATION_MESSAGE.to_string(),
        }
    }
}

/// 从CatalogError转换，对外只暴露面向用户的文案
impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        tracing::warn!("Catalog request failed: {}", err);
        match err {
            CatalogError::Validation(inner) => inner.into(),
            other => match other.kind() {
                CatalogErrorKind::RateLimited => {
                    ApiError::RateLimited(other.user_message().to_string())
                }
                _ => ApiError::ExternalService(other.user_message().to_string()),
            },
        }
    }
}

/// 从anyhow::Error转换
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// 实现IntoResponse，将错误转换为HTTP响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, field) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Validation { field, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                message,
                Some(field),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::RateLimited(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, "rate_limited", msg, None)
            }
            ApiError::ExternalService(msg) => {
                tracing::error!("External service error: {}", msg);
                (StatusCode::BAD_GATEWAY, "external_service_error", msg, None)
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "type": error_type,
            "message": message,
        });
        if let Some(field) = field {
            error["field"] = json!(field);
        }

        let body = Json(json!({
            "success": false,
            "error": error,
        }));

        (status, body).into_response()
    }
}

/// Result类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ApiError::NotFound("section".to_string());
        assert_eq!(error.to_string(), "Not found: section");
    }

    #[test]
    fn test_validation_error_conversion_keeps_field() {
        let api_error: ApiError = ValidationError::MutuallyExclusiveFilters.into();
        assert!(matches!(
            api_error,
            ApiError::Validation { field: "primary_release_year", .. }
        ));
    }

    #[test]
    fn test_catalog_error_conversion() {
        let api_error: ApiError = CatalogError::RateLimited.into();
        assert!(matches!(api_error, ApiError::RateLimited(_)));

        let api_error: ApiError = CatalogError::Unauthorized.into();
        assert!(matches!(api_error, ApiError::ExternalService(ref m) if m.contains("Authorization")));

        let api_error: ApiError = CatalogError::Validation(ValidationError::EmptySearchQuery).into();
        assert!(matches!(api_error, ApiError::Validation { field: "query", .. }));
    }

    #[tokio::test]
    async fn test_validation_response_does_not_echo_input() {
        let response =
            ApiError::from(ValidationError::InvalidGenres("28,<script>".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["field"], "with_genres");
        assert_eq!(body["error"]["message"], VALIDATION_MESSAGE);
        assert!(!String::from_utf8_lossy(&bytes).contains("script"));
    }

    #[test]
    fn test_status_codes() {
        let response = ApiError::from(ValidationError::InvalidYear(1800)).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = ApiError::RateLimited("slow down".into()).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
