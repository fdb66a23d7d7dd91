// URL 筛选存储
//
// 查询字符串是筛选状态唯一的持久来源：
// - 读取一律经过 `FilterStateCodec::parse`
// - 写入只通过 `update_filter` / `reset_filters`
// - 与筛选无关的查询参数在更新时保留

use url::form_urlencoded;

use crate::models::{DiscoverParams, FilterState, FilterUpdate, UrlFilterParams};
use crate::services::filter_codec::FilterStateCodec;
use crate::services::filter_merger::merge_filters_to_discover_params;
use crate::services::trend::Clock;

/// 以查询字符串为载体的筛选存储
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStore {
    /// 按出现顺序保存的全部查询参数
    pairs: Vec<(String, String)>,
}

impl FilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由筛选状态构建规范的查询字符串存储
    pub fn from_filter_state(state: &FilterState) -> Self {
        let mut store = Self::new();
        store.write_state(state);
        store
    }

    /// 从查询字符串构建（可带前导 `?`）
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = form_urlencoded::parse(query.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        Self { pairs }
    }

    /// 当前查询字符串（不带 `?`）
    pub fn query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// 读取某个参数的第一个值
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 提取筛选相关的 URL 参数
    pub fn url_params(&self) -> UrlFilterParams {
        let mut params = UrlFilterParams::default();
        for key in UrlFilterParams::KEYS {
            params.set(key, self.get(key).map(str::to_string));
        }
        params
    }

    /// 当前筛选状态
    pub fn filter_state(&self) -> FilterState {
        FilterStateCodec::parse(&self.url_params())
    }

    /// 当前筛选状态合并后的 discover 参数
    pub fn discover_params(&self, clock: &dyn Clock) -> DiscoverParams {
        merge_filters_to_discover_params(&self.filter_state(), clock)
    }

    /// 更新单个筛选字段并写回查询字符串
    pub fn update_filter(&mut self, update: FilterUpdate) {
        let mut state = self.filter_state();
        state.apply(update);
        self.write_state(&state);
    }

    /// 清空整个查询字符串
    pub fn reset_filters(&mut self) {
        self.pairs.clear();
    }

    fn write_state(&mut self, state: &FilterState) {
        let serialized = FilterStateCodec::serialize(state);
        for key in UrlFilterParams::KEYS {
            let value = serialized.get(key).filter(|v| !v.is_empty()).map(str::to_string);
            self.set_param(key, value);
        }
    }

    /// 与 URLSearchParams.set / delete 相同：替换第一个同名参数并移除其余
    fn set_param(&mut self, key: &str, value: Option<String>) {
        match value {
            None => self.pairs.retain(|(k, _)| k != key),
            Some(value) => {
                let mut replaced = false;
                self.pairs.retain_mut(|(k, v)| {
                    if k != key {
                        return true;
                    }
                    if replaced {
                        return false;
                    }
                    *v = value.clone();
                    replaced = true;
                    true
                });
                if !replaced {
                    self.pairs.push((key.to_string(), value));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateRange, QuickSortOption, TrendOption};
    use crate::services::trend::FixedClock;
    use chrono::NaiveDate;

    #[test]
    fn test_update_filter_writes_canonical_keys() {
        let mut store = FilterStore::new();
        store.update_filter(FilterUpdate::Trend(Some(TrendOption::Month)));
        store.update_filter(FilterUpdate::QuickGenres(vec![28, 12]));

        assert_eq!(store.query_string(), "trend=month&qgenres=28%2C12");
        assert_eq!(store.filter_state().quick_genres, vec![28, 12]);
    }

    #[test]
    fn test_update_filter_removes_cleared_keys() {
        let mut store = FilterStore::from_query_string("?trend=recent&sort=popular");
        store.update_filter(FilterUpdate::Trend(None));

        assert_eq!(store.get("trend"), None);
        assert_eq!(store.filter_state().quick_sort, Some(QuickSortOption::Popular));
    }

    #[test]
    fn test_unrelated_params_are_preserved() {
        let mut store = FilterStore::from_query_string("tab=movies&trend=recent");
        store.update_filter(FilterUpdate::QuickSort(Some(QuickSortOption::Rated)));

        assert_eq!(store.query_string(), "tab=movies&trend=recent&sort=rated");
    }

    #[test]
    fn test_malformed_values_are_normalised_on_next_write() {
        let mut store = FilterStore::from_query_string("qgenres=28,abc&advSort=bogus");
        store.update_filter(FilterUpdate::Trend(Some(TrendOption::Year)));

        assert_eq!(store.get("qgenres"), Some("28"));
        assert_eq!(store.get("advSort"), None);
    }

    #[test]
    fn test_duplicate_keys_collapse_to_one() {
        let mut store = FilterStore::from_query_string("sort=new&sort=rated");
        assert_eq!(store.filter_state().quick_sort, Some(QuickSortOption::New));

        store.update_filter(FilterUpdate::QuickSort(Some(QuickSortOption::Popular)));
        assert_eq!(store.query_string(), "sort=popular");
    }

    #[test]
    fn test_from_filter_state_drops_unrelated_keys() {
        let store = FilterStore::from_query_string("tab=movies&genres=16,16&trend=recent");
        let canonical = FilterStore::from_filter_state(&store.filter_state());
        assert_eq!(canonical.query_string(), "trend=recent&genres=16");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = FilterStore::from_query_string("tab=movies&trend=recent&genres=16");
        store.reset_filters();

        assert_eq!(store.query_string(), "");
        assert!(store.filter_state().is_empty());
    }

    #[test]
    fn test_refresh_reconstructs_identical_state() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1);
        let to = NaiveDate::from_ymd_opt(2024, 1, 31);

        let mut store = FilterStore::new();
        store.update_filter(FilterUpdate::DateRange(Some(DateRange::new(from, to))));
        store.update_filter(FilterUpdate::AdvancedGenres(vec![16, 35]));

        let reloaded = FilterStore::from_query_string(&store.query_string());
        assert_eq!(reloaded.filter_state(), store.filter_state());

        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        let params = reloaded.discover_params(&clock);
        assert_eq!(params.with_genres.as_deref(), Some("16,35"));
        assert_eq!(params.primary_release_date_gte.as_deref(), Some("2024-01-01"));
    }
}
