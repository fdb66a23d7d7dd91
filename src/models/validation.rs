use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use super::discover::DiscoverParams;
use super::filter::SortOption;

lazy_static! {
    static ref CALENDAR_DATE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern");
}

/// 年份允许的范围
pub const MIN_RELEASE_YEAR: i32 = 1900;
pub const MAX_RELEASE_YEAR: i32 = 2100;

/// 搜索关键词最大长度
pub const MAX_SEARCH_QUERY_LEN: usize = 100;

/// 验证错误类型
///
/// 每个错误都带有对应的字段名，仅用于诊断，不直接展示给终端用户
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("with_genres must be comma-separated numbers: {0}")]
    InvalidGenres(String),

    #[error("Invalid year: {0} (must be between 1900 and 2100)")]
    InvalidYear(i32),

    #[error("Invalid sort_by value: {0}")]
    InvalidSort(String),

    #[error("{field} must be formatted as YYYY-MM-DD, got: {value}")]
    InvalidDate { field: &'static str, value: String },

    /// 年份与日期区间不能同时使用
    #[error("Cannot use both primary_release_year and date range")]
    MutuallyExclusiveFilters,

    #[error("Search query must be at least 1 character")]
    EmptySearchQuery,

    #[error("Search query must not exceed 100 characters")]
    SearchQueryTooLong,
}

impl ValidationError {
    /// 出错的字段名
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidGenres(_) => "with_genres",
            ValidationError::InvalidYear(_) => "primary_release_year",
            ValidationError::InvalidSort(_) => "sort_by",
            ValidationError::InvalidDate { field, .. } => *field,
            ValidationError::MutuallyExclusiveFilters => "primary_release_year",
            ValidationError::EmptySearchQuery | ValidationError::SearchQueryTooLong => "query",
        }
    }

    pub fn is_mutually_exclusive(&self) -> bool {
        matches!(self, ValidationError::MutuallyExclusiveFilters)
    }
}

/// 验证器trait
pub trait Validator {
    type Error;

    fn validate(&self) -> Result<(), Self::Error>;
}

/// 字符串验证工具
pub struct StringValidator;

impl StringValidator {
    /// 每个逗号分隔的片段都必须是数字
    pub fn validate_genres(genres: &Option<String>) -> Result<(), ValidationError> {
        if let Some(list) = genres {
            let all_numeric = list.split(',').all(|token| {
                token
                    .trim()
                    .parse::<f64>()
                    .map(|value| value.is_finite())
                    .unwrap_or(false)
            });
            if !all_numeric {
                return Err(ValidationError::InvalidGenres(list.clone()));
            }
        }
        Ok(())
    }

    pub fn validate_sort(sort_by: &Option<String>) -> Result<(), ValidationError> {
        if let Some(value) = sort_by {
            if value.parse::<SortOption>().is_err() {
                return Err(ValidationError::InvalidSort(value.clone()));
            }
        }
        Ok(())
    }

    pub fn validate_date(field: &'static str, date: &Option<String>) -> Result<(), ValidationError> {
        if let Some(value) = date {
            if !CALENDAR_DATE.is_match(value) {
                return Err(ValidationError::InvalidDate {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

/// 数值验证工具
pub struct NumberValidator;

impl NumberValidator {
    pub fn validate_year(year: &Option<i32>) -> Result<(), ValidationError> {
        if let Some(y) = year {
            if *y < MIN_RELEASE_YEAR || *y > MAX_RELEASE_YEAR {
                return Err(ValidationError::InvalidYear(*y));
            }
        }
        Ok(())
    }
}

impl Validator for DiscoverParams {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), ValidationError> {
        StringValidator::validate_genres(&self.with_genres)?;
        NumberValidator::validate_year(&self.primary_release_year)?;
        StringValidator::validate_sort(&self.sort_by)?;
        StringValidator::validate_date("primary_release_date_gte", &self.primary_release_date_gte)?;
        StringValidator::validate_date("primary_release_date_lte", &self.primary_release_date_lte)?;

        // 交叉字段规则：只能选择一种时间筛选方式
        if self.primary_release_year.is_some() && self.has_date_bound() {
            return Err(ValidationError::MutuallyExclusiveFilters);
        }

        Ok(())
    }
}

/// discover 参数校验器
///
/// 发送给目录 API 之前的最后一道检查
pub struct ParamValidator;

impl ParamValidator {
    /// 清理空值后校验，成功时返回清理后的参数
    ///
    /// 空字符串视为"未提供"，不会与"提供了但无效"的值混淆
    pub fn validate(params: DiscoverParams) -> Result<DiscoverParams, ValidationError> {
        let cleaned = Self::strip_empty(params);
        cleaned.validate()?;
        Ok(cleaned)
    }

    fn strip_empty(params: DiscoverParams) -> DiscoverParams {
        fn non_empty(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        DiscoverParams {
            with_genres: non_empty(params.with_genres),
            primary_release_year: params.primary_release_year,
            sort_by: non_empty(params.sort_by),
            primary_release_date_gte: non_empty(params.primary_release_date_gte),
            primary_release_date_lte: non_empty(params.primary_release_date_lte),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres(value: &str) -> DiscoverParams {
        DiscoverParams {
            with_genres: Some(value.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_malformed_genres() {
        let err = ParamValidator::validate(genres("28,abc")).unwrap_err();
        assert_eq!(err, ValidationError::InvalidGenres("28,abc".to_string()));
        assert_eq!(err.field(), "with_genres");
    }

    #[test]
    fn test_accepts_numeric_genres_unchanged() {
        let params = genres("28,12");
        let validated = ParamValidator::validate(params.clone()).unwrap();
        assert_eq!(validated, params);
    }

    #[test]
    fn test_rejects_year_with_date_range() {
        let params = DiscoverParams {
            primary_release_year: Some(2020),
            primary_release_date_gte: Some("2020-01-01".to_string()),
            ..Default::default()
        };
        let err = ParamValidator::validate(params).unwrap_err();
        assert!(err.is_mutually_exclusive());
    }

    #[test]
    fn test_year_bounds() {
        for (year, ok) in [(1899, false), (1900, true), (2100, true), (2101, false)] {
            let params = DiscoverParams {
                primary_release_year: Some(year),
                ..Default::default()
            };
            assert_eq!(ParamValidator::validate(params).is_ok(), ok, "year {}", year);
        }
    }

    #[test]
    fn test_rejects_unknown_sort() {
        let params = DiscoverParams {
            sort_by: Some("title.asc".to_string()),
            ..Default::default()
        };
        let err = ParamValidator::validate(params).unwrap_err();
        assert_eq!(err.field(), "sort_by");
    }

    #[test]
    fn test_date_format_must_be_exact() {
        let params = DiscoverParams {
            primary_release_date_lte: Some("2024-1-31".to_string()),
            ..Default::default()
        };
        let err = ParamValidator::validate(params).unwrap_err();
        assert_eq!(err.field(), "primary_release_date_lte");
    }

    #[test]
    fn test_empty_strings_are_stripped_before_validation() {
        let params = DiscoverParams {
            with_genres: Some(String::new()),
            sort_by: Some(String::new()),
            primary_release_year: Some(2020),
            primary_release_date_gte: Some(String::new()),
            ..Default::default()
        };
        let validated = ParamValidator::validate(params).unwrap();
        assert_eq!(
            validated,
            DiscoverParams {
                primary_release_year: Some(2020),
                ..Default::default()
            }
        );
    }
}
