use serde::{Deserialize, Serialize};

/// 发送给目录 API（discover 接口）的规范查询参数
///
/// 字段保留原始字符串形式，由 `ParamValidator` 负责校验
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoverParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_genres: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_release_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_release_date_gte: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_release_date_lte: Option<String>,
}

impl DiscoverParams {
    pub fn is_empty(&self) -> bool {
        self.with_genres.is_none()
            && self.primary_release_year.is_none()
            && self.sort_by.is_none()
            && self.primary_release_date_gte.is_none()
            && self.primary_release_date_lte.is_none()
    }

    /// 是否带有日期区间的任一端
    pub fn has_date_bound(&self) -> bool {
        self.primary_release_date_gte.is_some() || self.primary_release_date_lte.is_some()
    }

    /// 以目录 API 的参数名列出非空字段（固定顺序）
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref genres) = self.with_genres {
            pairs.push(("with_genres", genres.clone()));
        }
        if let Some(year) = self.primary_release_year {
            pairs.push(("primary_release_year", year.to_string()));
        }
        if let Some(ref sort_by) = self.sort_by {
            pairs.push(("sort_by", sort_by.clone()));
        }
        if let Some(ref gte) = self.primary_release_date_gte {
            pairs.push(("primary_release_date.gte", gte.clone()));
        }
        if let Some(ref lte) = self.primary_release_date_lte {
            pairs.push(("primary_release_date.lte", lte.clone()));
        }
        pairs
    }
}

/// 目录 API 的分页响应
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginatedResponse<T> {
    pub page: u32,
    pub results: Vec<T>,
    pub total_pages: u32,
    pub total_results: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }
}
