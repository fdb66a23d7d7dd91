// 搜索关键词处理
//
// - normalize：面向缓存键与交互的轻量规范化，不删除字符
// - sanitize + validate：发送给目录 API 之前的清理与校验

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::validation::MAX_SEARCH_QUERY_LEN;
use crate::models::ValidationError;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid whitespace pattern");
    static ref UNSAFE_CHARS: Regex = Regex::new(r"[<>`\\/]").expect("valid unsafe char pattern");
}

/// 规范化后关键词的最大长度
pub const MAX_NORMALIZED_QUERY_LEN: usize = 80;

/// 去除首尾空白、合并连续空白并截断到 80 个字符
pub fn normalize_search_query(input: &str) -> String {
    let collapsed = WHITESPACE.replace_all(input.trim(), " ");
    truncate_chars(&collapsed, MAX_NORMALIZED_QUERY_LEN)
}

/// 移除可能用于注入的字符，合并空白并截断到 100 个字符
pub fn sanitize_input(input: &str) -> String {
    let stripped = UNSAFE_CHARS.replace_all(input.trim(), "");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    truncate_chars(&collapsed, MAX_SEARCH_QUERY_LEN)
}

/// 先清理再校验，返回可以直接发送的关键词
pub fn validate_search_query(query: &str) -> Result<String, ValidationError> {
    let sanitized = sanitize_input(query);
    if sanitized.is_empty() {
        return Err(ValidationError::EmptySearchQuery);
    }
    if sanitized.chars().count() > MAX_SEARCH_QUERY_LEN {
        return Err(ValidationError::SearchQueryTooLong);
    }
    Ok(sanitized)
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// 分页搜索的查询条件
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    query: String,
}

impl SearchQuery {
    /// 以规范化后的关键词构建
    pub fn new(raw: &str) -> Self {
        Self {
            query: normalize_search_query(raw),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    /// 规范化后超过一个字符才发起搜索
    pub fn is_enabled(&self) -> bool {
        self.query.chars().count() > 1
    }
}
