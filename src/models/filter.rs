use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 快速筛选的热度时间窗口
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrendOption {
    /// 最近 7 天
    Recent,
    /// 最近 30 天
    Month,
    /// 最近一年
    Year,
}

impl TrendOption {
    pub const ALL: [TrendOption; 3] = [TrendOption::Recent, TrendOption::Month, TrendOption::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendOption::Recent => "recent",
            TrendOption::Month => "month",
            TrendOption::Year => "year",
        }
    }
}

impl std::fmt::Display for TrendOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TrendOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(TrendOption::Recent),
            "month" => Ok(TrendOption::Month),
            "year" => Ok(TrendOption::Year),
            _ => Err(format!("Invalid trend option: {}", s)),
        }
    }
}

/// 快速排序预设
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QuickSortOption {
    Popular,
    Rated,
    New,
}

impl QuickSortOption {
    pub const ALL: [QuickSortOption; 3] = [
        QuickSortOption::Popular,
        QuickSortOption::Rated,
        QuickSortOption::New,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuickSortOption::Popular => "popular",
            QuickSortOption::Rated => "rated",
            QuickSortOption::New => "new",
        }
    }

    /// 转换为目录 API 的排序表达式
    pub fn to_sort_option(self) -> SortOption {
        match self {
            QuickSortOption::Popular => SortOption::PopularityDesc,
            QuickSortOption::Rated => SortOption::VoteAverageDesc,
            QuickSortOption::New => SortOption::ReleaseDateDesc,
        }
    }
}

impl std::fmt::Display for QuickSortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuickSortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popular" => Ok(QuickSortOption::Popular),
            "rated" => Ok(QuickSortOption::Rated),
            "new" => Ok(QuickSortOption::New),
            _ => Err(format!("Invalid quick sort option: {}", s)),
        }
    }
}

/// 目录 API 支持的排序表达式（字段 + 方向）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SortOption {
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    #[serde(rename = "popularity.asc")]
    PopularityAsc,
    #[serde(rename = "vote_average.desc")]
    VoteAverageDesc,
    #[serde(rename = "vote_average.asc")]
    VoteAverageAsc,
    #[serde(rename = "release_date.desc")]
    ReleaseDateDesc,
    #[serde(rename = "release_date.asc")]
    ReleaseDateAsc,
}

impl SortOption {
    pub const ALL: [SortOption; 6] = [
        SortOption::PopularityDesc,
        SortOption::PopularityAsc,
        SortOption::VoteAverageDesc,
        SortOption::VoteAverageAsc,
        SortOption::ReleaseDateDesc,
        SortOption::ReleaseDateAsc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::PopularityDesc => "popularity.desc",
            SortOption::PopularityAsc => "popularity.asc",
            SortOption::VoteAverageDesc => "vote_average.desc",
            SortOption::VoteAverageAsc => "vote_average.asc",
            SortOption::ReleaseDateDesc => "release_date.desc",
            SortOption::ReleaseDateAsc => "release_date.asc",
        }
    }
}

impl std::fmt::Display for SortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOption::ALL
            .iter()
            .copied()
            .find(|option| option.as_str() == s)
            .ok_or_else(|| format!("Invalid sort option: {}", s))
    }
}

/// 用户选择的日期区间
///
/// 两端都有值才算完整区间，只有完整区间会参与合并
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// 返回完整区间 `(from, to)`，部分区间返回 None
    pub fn complete(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// 筛选状态（UI 层的规范内存表示）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterState {
    // 快速筛选
    pub trend: Option<TrendOption>,
    pub quick_sort: Option<QuickSortOption>,
    pub quick_genres: Vec<u32>,

    // 高级筛选
    pub advanced_genres: Vec<u32>,
    pub date_range: Option<DateRange>,
    pub advanced_sort: Option<SortOption>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否没有任何筛选条件
    pub fn is_empty(&self) -> bool {
        self.active_filter_count() == 0
    }

    /// 当前生效的筛选维度数量（用于筛选标签展示）
    pub fn active_filter_count(&self) -> usize {
        [
            self.trend.is_some(),
            self.quick_sort.is_some(),
            !self.quick_genres.is_empty(),
            !self.advanced_genres.is_empty(),
            self.date_range.map(|range| !range.is_empty()).unwrap_or(false),
            self.advanced_sort.is_some(),
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }

    /// 切换热度窗口：再次选择当前值时清除
    pub fn toggle_trend(&mut self, trend: TrendOption) {
        self.trend = if self.trend == Some(trend) { None } else { Some(trend) };
    }

    /// 切换快速排序：再次选择当前值时清除
    pub fn toggle_quick_sort(&mut self, sort: QuickSortOption) {
        self.quick_sort = if self.quick_sort == Some(sort) { None } else { Some(sort) };
    }

    pub fn toggle_quick_genre(&mut self, genre_id: u32) {
        toggle_genre(&mut self.quick_genres, genre_id);
    }

    pub fn toggle_advanced_genre(&mut self, genre_id: u32) {
        toggle_genre(&mut self.advanced_genres, genre_id);
    }

    /// 应用单个字段更新
    pub fn apply(&mut self, update: FilterUpdate) {
        match update {
            FilterUpdate::Trend(value) => self.trend = value,
            FilterUpdate::QuickSort(value) => self.quick_sort = value,
            FilterUpdate::QuickGenres(value) => self.quick_genres = dedup_genres(value),
            FilterUpdate::AdvancedGenres(value) => self.advanced_genres = dedup_genres(value),
            FilterUpdate::DateRange(value) => {
                self.date_range = value.filter(|range| !range.is_empty())
            }
            FilterUpdate::AdvancedSort(value) => self.advanced_sort = value,
        }
    }
}

/// 针对单个 `FilterState` 字段的更新
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FilterUpdate {
    Trend(Option<TrendOption>),
    QuickSort(Option<QuickSortOption>),
    QuickGenres(Vec<u32>),
    AdvancedGenres(Vec<u32>),
    DateRange(Option<DateRange>),
    AdvancedSort(Option<SortOption>),
}

/// 去重并保留首次出现的顺序
pub fn dedup_genres(genres: Vec<u32>) -> Vec<u32> {
    let mut unique = Vec::with_capacity(genres.len());
    for id in genres {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

fn toggle_genre(genres: &mut Vec<u32>, genre_id: u32) {
    if let Some(index) = genres.iter().position(|id| *id == genre_id) {
        genres.remove(index);
    } else {
        genres.push(genre_id);
    }
}

/// URL 查询参数（传输层表示，扁平的字符串键值）
///
/// 每个 `FilterState` 字段对应一个键，空值不出现
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UrlFilterParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qgenres: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<String>,
    #[serde(default, rename = "dateFrom", skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, rename = "dateTo", skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(default, rename = "advSort", skip_serializing_if = "Option::is_none")]
    pub adv_sort: Option<String>,
}

impl UrlFilterParams {
    /// URL 中使用的全部键名
    pub const KEYS: [&'static str; 7] = [
        "trend", "sort", "qgenres", "genres", "dateFrom", "dateTo", "advSort",
    ];

    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "trend" => &self.trend,
            "sort" => &self.sort,
            "qgenres" => &self.qgenres,
            "genres" => &self.genres,
            "dateFrom" => &self.date_from,
            "dateTo" => &self.date_to,
            "advSort" => &self.adv_sort,
            _ => return None,
        };
        value.as_deref()
    }

    /// 设置键值；未知键被忽略
    pub fn set(&mut self, key: &str, value: Option<String>) {
        let slot = match key {
            "trend" => &mut self.trend,
            "sort" => &mut self.sort,
            "qgenres" => &mut self.qgenres,
            "genres" => &mut self.genres,
            "dateFrom" => &mut self.date_from,
            "dateTo" => &mut self.date_to,
            "advSort" => &mut self.adv_sort,
            _ => return,
        };
        *slot = value;
    }

    /// 按固定键顺序列出非空的键值对
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        Self::KEYS
            .iter()
            .filter_map(|key| {
                self.get(key)
                    .filter(|value| !value.is_empty())
                    .map(|value| (*key, value))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }
}

/// 推荐的快速类型（动作、剧情、喜剧、惊悚、科幻、恐怖）
pub const QUICK_GENRES: [u32; 6] = [28, 18, 35, 53, 878, 27];
