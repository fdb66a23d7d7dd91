// 目录 API 错误类型定义
//
// 按状态信号粗略区分（未授权、限流、连接、其他），用于选择提示文案。
// 所有错误都可以通过手动重试恢复，不会自动重试。

use serde::Serialize;
use thiserror::Error;

use crate::models::ValidationError;

/// 目录 API 调用的统一错误类型
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("参数校验失败: {0}")]
    Validation(#[from] ValidationError),

    #[error("未配置 TMDB 访问凭证")]
    MissingCredentials,

    #[error("TMDB 拒绝访问 (401)")]
    Unauthorized,

    #[error("TMDB 请求过于频繁 (429)")]
    RateLimited,

    #[error("网络错误: {0}")]
    Connectivity(String),

    #[error("HTTP 错误: 状态码 {0}")]
    Status(u16),

    #[error("响应解析失败: {0}")]
    Decode(String),
}

/// 错误类别（供渲染层选择文案）
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CatalogErrorKind {
    Validation,
    Unauthorized,
    RateLimited,
    Connectivity,
    Other,
}

impl CatalogError {
    /// 根据 HTTP 状态码构建错误
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => CatalogError::Unauthorized,
            429 => CatalogError::RateLimited,
            other => CatalogError::Status(other),
        }
    }

    pub fn kind(&self) -> CatalogErrorKind {
        match self {
            CatalogError::Validation(_) => CatalogErrorKind::Validation,
            CatalogError::Unauthorized | CatalogError::MissingCredentials => {
                CatalogErrorKind::Unauthorized
            }
            CatalogError::RateLimited => CatalogErrorKind::RateLimited,
            CatalogError::Connectivity(_) => CatalogErrorKind::Connectivity,
            CatalogError::Status(_) | CatalogError::Decode(_) => CatalogErrorKind::Other,
        }
    }

    /// 面向终端用户的提示文案（不暴露内部字段）
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            CatalogErrorKind::Unauthorized => "Authorization problem - check the API settings.",
            CatalogErrorKind::RateLimited => "Too many requests - try again in a few moments.",
            CatalogErrorKind::Connectivity => "No internet connection or the server is not responding.",
            CatalogErrorKind::Validation | CatalogErrorKind::Other => {
                "Something went wrong - please try again later."
            }
        }
    }
}

// 实现从 reqwest::Error 到 CatalogError 的转换
impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            CatalogError::from_status(status.as_u16())
        } else if err.is_decode() {
            CatalogError::Decode(err.to_string())
        } else {
            CatalogError::Connectivity(err.to_string())
        }
    }
}

/// 可序列化的错误信息（渲染层读取）
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: CatalogErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl From<&CatalogError> for ErrorInfo {
    fn from(err: &CatalogError) -> Self {
        let field = match err {
            CatalogError::Validation(inner) => Some(inner.field()),
            _ => None,
        };
        Self {
            kind: err.kind(),
            message: err.user_message().to_string(),
            field,
        }
    }
}
