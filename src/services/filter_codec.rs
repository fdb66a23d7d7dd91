// 筛选状态编解码
//
// 在结构化的 `FilterState` 与扁平的 URL 参数之间双向转换：
// - 类型列表编码为逗号分隔的十进制整数
// - 日期编码为 YYYY-MM-DD
// - 空值不写入 URL；解析时单个字段的异常值按缺省处理，不影响其他字段

use chrono::{DateTime, NaiveDate};

use crate::models::{dedup_genres, DateRange, FilterState, UrlFilterParams};
use crate::services::trend::{format_date, DATE_FORMAT};

/// 筛选状态编解码器
pub struct FilterStateCodec;

impl FilterStateCodec {
    /// 从 URL 参数解析筛选状态，永不失败
    pub fn parse(params: &UrlFilterParams) -> FilterState {
        let date_from = non_empty(&params.date_from);
        let date_to = non_empty(&params.date_to);

        let date_range = if date_from.is_some() || date_to.is_some() {
            Some(DateRange {
                from: date_from.and_then(|value| parse_date("dateFrom", value)),
                to: date_to.and_then(|value| parse_date("dateTo", value)),
            })
        } else {
            None
        };

        FilterState {
            trend: parse_enum("trend", &params.trend),
            quick_sort: parse_enum("sort", &params.sort),
            quick_genres: non_empty(&params.qgenres)
                .map(parse_comma_separated)
                .unwrap_or_default(),
            advanced_genres: non_empty(&params.genres)
                .map(parse_comma_separated)
                .unwrap_or_default(),
            date_range,
            advanced_sort: parse_enum("advSort", &params.adv_sort),
        }
    }

    /// 将筛选状态序列化为 URL 参数，只输出非空字段
    pub fn serialize(state: &FilterState) -> UrlFilterParams {
        let date_range = state.date_range.unwrap_or_default();

        UrlFilterParams {
            trend: state.trend.map(|trend| trend.as_str().to_string()),
            sort: state.quick_sort.map(|sort| sort.as_str().to_string()),
            qgenres: join_genres(&state.quick_genres),
            genres: join_genres(&state.advanced_genres),
            date_from: date_range.from.map(format_date),
            date_to: date_range.to.map(format_date),
            adv_sort: state.advanced_sort.map(|sort| sort.as_str().to_string()),
        }
    }
}

/// "28,12,16" → [28, 12, 16]，无法解析的片段被丢弃
pub fn parse_comma_separated(value: &str) -> Vec<u32> {
    let ids = value
        .split(',')
        .filter_map(|token| {
            let token = token.trim();
            match token.parse::<u32>() {
                Ok(id) => Some(id),
                Err(_) => {
                    if !token.is_empty() {
                        tracing::debug!("Dropping malformed genre id from URL: {:?}", token);
                    }
                    None
                }
            }
        })
        .collect();
    dedup_genres(ids)
}

/// [28, 12] → "28,12"，空集合返回 None
pub fn join_genres(genres: &[u32]) -> Option<String> {
    if genres.is_empty() {
        return None;
    }
    Some(
        genres
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// 解析日历日期；同时接受 RFC 3339 时间戳并取其日期部分
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

fn parse_date(key: &str, value: &str) -> Option<NaiveDate> {
    let parsed = parse_calendar_date(value);
    if parsed.is_none() {
        tracing::debug!("Ignoring unparseable date for {}: {:?}", key, value);
    }
    parsed
}

fn parse_enum<T: std::str::FromStr>(key: &str, value: &Option<String>) -> Option<T> {
    let raw = non_empty(value)?;
    match raw.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::debug!("Ignoring unknown value for {}: {:?}", key, raw);
            None
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
