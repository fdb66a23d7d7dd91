// 筛选合并
//
// 将 `FilterState` 合并为发送给目录 API 的 `DiscoverParams`。
// 各维度的优先级规则相互独立：
// 1. 类型：快速类型与高级类型取并集
// 2. 日期：完整的自定义区间优先，其次是热度窗口
// 3. 排序：高级排序优先，其次是快速排序

use crate::models::{dedup_genres, DiscoverParams, FilterState, SortOption};
use crate::services::filter_codec::join_genres;
use crate::services::trend::{format_date, get_trend_date_range, Clock};

/// 合并筛选状态，纯函数，不做校验
pub fn merge_filters_to_discover_params(state: &FilterState, clock: &dyn Clock) -> DiscoverParams {
    let mut params = DiscoverParams::default();

    // 1. 类型并集（快速在前，去重）
    let all_genres = dedup_genres(
        state
            .quick_genres
            .iter()
            .chain(state.advanced_genres.iter())
            .copied()
            .collect(),
    );
    params.with_genres = join_genres(&all_genres);

    // 2. 日期：部分区间不参与，整体回退到热度窗口
    if let Some((from, to)) = state.date_range.and_then(|range| range.complete()) {
        params.primary_release_date_gte = Some(format_date(from));
        params.primary_release_date_lte = Some(format_date(to));
    } else if let Some(trend) = state.trend {
        let window = get_trend_date_range(trend, clock);
        params.primary_release_date_gte = Some(window.gte_string());
        params.primary_release_date_lte = Some(window.lte_string());
    }

    // 3. 排序
    let sort = state
        .advanced_sort
        .or_else(|| state.quick_sort.map(|quick| quick.to_sort_option()));
    params.sort_by = sort.map(|s| s.as_str().to_string());

    params
}

/// 合并器，持有注入的时钟
pub struct FilterMerger<C: Clock> {
    clock: C,
}

impl<C: Clock> FilterMerger<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn merge(&self, state: &FilterState) -> DiscoverParams {
        merge_filters_to_discover_params(state, &self.clock)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// "热门" 区块的预设参数
pub fn trending_params() -> DiscoverParams {
    DiscoverParams {
        sort_by: Some(SortOption::PopularityDesc.as_str().to_string()),
        ..Default::default()
    }
}

/// "即将上映" 区块的预设参数：UTC 今天及以后上映，按上映日期倒序
pub fn coming_soon_params(clock: &dyn Clock) -> DiscoverParams {
    DiscoverParams {
        sort_by: Some(SortOption::ReleaseDateDesc.as_str().to_string()),
        primary_release_date_gte: Some(format_date(clock.utc_today())),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateRange, QuickSortOption, TrendOption};
    use crate::services::filter_codec::parse_comma_separated;
    use crate::services::trend::FixedClock;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn merger() -> FilterMerger<FixedClock> {
        FilterMerger::new(FixedClock(date("2024-03-15")))
    }

    #[test]
    fn test_empty_state_merges_to_empty_params() {
        assert!(merger().merge(&FilterState::default()).is_empty());
    }

    #[test]
    fn test_genre_union_without_duplicates() {
        let state = FilterState {
            quick_genres: vec![28, 12],
            advanced_genres: vec![12, 16],
            ..Default::default()
        };

        let params = merger().merge(&state);
        let genres = params.with_genres.unwrap();
        assert_eq!(genres, "28,12,16");
        let set: HashSet<u32> = parse_comma_separated(&genres).into_iter().collect();
        assert_eq!(set, HashSet::from([28, 12, 16]));
    }

    #[test]
    fn test_complete_date_range_beats_trend() {
        let state = FilterState {
            trend: Some(TrendOption::Month),
            date_range: Some(DateRange::new(Some(date("2024-01-01")), Some(date("2024-01-31")))),
            ..Default::default()
        };

        let params = merger().merge(&state);
        assert_eq!(params.primary_release_date_gte.as_deref(), Some("2024-01-01"));
        assert_eq!(params.primary_release_date_lte.as_deref(), Some("2024-01-31"));
    }

    #[test]
    fn test_partial_date_range_falls_back_to_trend() {
        let state = FilterState {
            trend: Some(TrendOption::Recent),
            date_range: Some(DateRange::new(Some(date("2020-01-01")), None)),
            ..Default::default()
        };

        let params = merger().merge(&state);
        assert_eq!(params.primary_release_date_gte.as_deref(), Some("2024-03-08"));
        assert_eq!(params.primary_release_date_lte.as_deref(), Some("2024-03-15"));
    }

    #[test]
    fn test_partial_date_range_without_trend_emits_nothing() {
        let state = FilterState {
            date_range: Some(DateRange::new(None, Some(date("2020-01-01")))),
            ..Default::default()
        };

        let params = merger().merge(&state);
        assert!(!params.has_date_bound());
    }

    #[test]
    fn test_advanced_sort_beats_quick_sort() {
        let state = FilterState {
            quick_sort: Some(QuickSortOption::Popular),
            advanced_sort: Some(SortOption::VoteAverageAsc),
            ..Default::default()
        };

        assert_eq!(merger().merge(&state).sort_by.as_deref(), Some("vote_average.asc"));
    }

    #[test]
    fn test_quick_sort_mapping_applies_alone() {
        let state = FilterState {
            quick_sort: Some(QuickSortOption::New),
            ..Default::default()
        };

        assert_eq!(merger().merge(&state).sort_by.as_deref(), Some("release_date.desc"));
    }

    #[test]
    fn test_merge_never_sets_release_year() {
        let state = FilterState {
            trend: Some(TrendOption::Year),
            ..Default::default()
        };
        assert_eq!(merger().merge(&state).primary_release_year, None);
    }

    #[test]
    fn test_presets() {
        let clock = FixedClock(date("2024-03-15"));
        assert_eq!(trending_params().sort_by.as_deref(), Some("popularity.desc"));
        let coming = coming_soon_params(&clock);
        assert_eq!(coming.primary_release_date_gte.as_deref(), Some("2024-03-15"));
        assert_eq!(coming.sort_by.as_deref(), Some("release_date.desc"));
    }

    /// 本地日期已经跨到第二天，UTC 仍是前一天
    struct AheadOfUtc;

    impl Clock for AheadOfUtc {
        fn today(&self) -> NaiveDate {
            date("2024-03-16")
        }

        fn utc_today(&self) -> NaiveDate {
            date("2024-03-15")
        }
    }

    #[test]
    fn test_coming_soon_uses_utc_date() {
        let coming = coming_soon_params(&AheadOfUtc);
        assert_eq!(coming.primary_release_date_gte.as_deref(), Some("2024-03-15"));

        let trend = get_trend_date_range(TrendOption::Recent, &AheadOfUtc);
        assert_eq!(trend.lte_string(), "2024-03-16");
    }
}
