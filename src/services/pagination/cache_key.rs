use std::fmt;

use serde::Serialize;
use url::form_urlencoded;

use crate::models::DiscoverParams;
use crate::services::search::SearchQuery;

/// 一条分页序列的缓存键
///
/// 由作用域和按固定顺序排列的非空字段组成，
/// 语义相同的查询无论如何构造都得到相同的键
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// 由作用域和字段对构建，值为空的字段被忽略
    pub fn new(scope: &str, fields: &[(&str, String)]) -> Self {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        let mut any = false;
        for (name, value) in fields {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            serializer.append_pair(name, value);
            any = true;
        }

        if any {
            CacheKey(format!("{}?{}", scope, serializer.finish()))
        } else {
            CacheKey(scope.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 可以分页请求的查询
pub trait PageQuery: Clone + Send + Sync + 'static {
    fn cache_key(&self) -> CacheKey;

    /// 为 false 时不发起任何请求
    fn is_enabled(&self) -> bool {
        true
    }
}

pub const DISCOVERY_SCOPE: &str = "discovery";
pub const SEARCH_SCOPE: &str = "search/movies";

/// 目录 API 把类型列表视为集合：数字排序并去重，非数字列表原样保留
fn canonical_genres(genres: &str) -> String {
    let tokens: Vec<&str> = genres.split(',').map(str::trim).collect();
    let parsed: Option<Vec<u64>> = tokens.iter().map(|t| t.parse::<u64>().ok()).collect();

    match parsed {
        Some(mut ids) => {
            ids.sort_unstable();
            ids.dedup();
            ids.iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",")
        }
        None => tokens.join(","),
    }
}

impl PageQuery for DiscoverParams {
    fn cache_key(&self) -> CacheKey {
        let fields = [
            (
                "with_genres",
                self.with_genres.as_deref().map(canonical_genres).unwrap_or_default(),
            ),
            (
                "primary_release_year",
                self.primary_release_year.map(|y| y.to_string()).unwrap_or_default(),
            ),
            ("sort_by", self.sort_by.clone().unwrap_or_default()),
            (
                "primary_release_date.gte",
                self.primary_release_date_gte.clone().unwrap_or_default(),
            ),
            (
                "primary_release_date.lte",
                self.primary_release_date_lte.clone().unwrap_or_default(),
            ),
        ];
        CacheKey::new(DISCOVERY_SCOPE, &fields)
    }
}

impl PageQuery for SearchQuery {
    fn cache_key(&self) -> CacheKey {
        CacheKey::new(SEARCH_SCOPE, &[("query", self.as_str().to_string())])
    }

    fn is_enabled(&self) -> bool {
        SearchQuery::is_enabled(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params_use_bare_scope() {
        assert_eq!(DiscoverParams::default().cache_key().as_str(), "discovery");
    }

    #[test]
    fn test_independent_construction_yields_same_key() {
        let a = DiscoverParams {
            sort_by: Some("popularity.desc".to_string()),
            with_genres: Some("28,12".to_string()),
            ..Default::default()
        };
        let mut b = DiscoverParams::default();
        b.with_genres = Some("12, 28,28".to_string());
        b.sort_by = Some("popularity.desc".to_string());

        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(
            a.cache_key().as_str(),
            "discovery?with_genres=12%2C28&sort_by=popularity.desc"
        );
    }

    #[test]
    fn test_fields_follow_canonical_order() {
        let params = DiscoverParams {
            primary_release_date_lte: Some("2024-03-15".to_string()),
            primary_release_date_gte: Some("2024-03-08".to_string()),
            sort_by: Some("vote_average.desc".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.cache_key().as_str(),
            "discovery?sort_by=vote_average.desc&primary_release_date.gte=2024-03-08&primary_release_date.lte=2024-03-15"
        );
    }

    #[test]
    fn test_blank_fields_are_ignored() {
        let params = DiscoverParams {
            with_genres: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.cache_key(), DiscoverParams::default().cache_key());
    }

    #[test]
    fn test_different_filters_yield_different_keys() {
        let year = DiscoverParams {
            primary_release_year: Some(1999),
            ..Default::default()
        };
        assert_ne!(year.cache_key(), DiscoverParams::default().cache_key());
    }

    #[test]
    fn test_search_key_uses_normalised_query() {
        let a = SearchQuery::new("  the   matrix ");
        let b = SearchQuery::new("the matrix");
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key().as_str(), "search/movies?query=the+matrix");
        assert!(!PageQuery::is_enabled(&SearchQuery::new("x")));
    }
}
