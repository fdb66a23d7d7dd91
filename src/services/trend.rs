// 热度时间窗口计算
//
// 将命名的相对时间窗口（recent / month / year）换算为绝对日期区间。
// 两端都由同一个 "今天" 快照推导，时钟通过 `Clock` 注入以便测试。

use chrono::{Duration, Local, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::TrendOption;

/// 日期格式（YYYY-MM-DD，本地日历日期，无时区）
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 提供 "今天" 的时钟
pub trait Clock: Send + Sync {
    /// 本地日历日期
    fn today(&self) -> NaiveDate;

    /// UTC 日历日期（默认与本地相同）
    fn utc_today(&self) -> NaiveDate {
        self.today()
    }
}

/// 系统本地时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn utc_today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// 固定日期时钟（测试与回放使用）
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// 热度窗口换算结果，两端都包含在内
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrendWindow {
    pub gte: NaiveDate,
    pub lte: NaiveDate,
}

impl TrendWindow {
    pub fn gte_string(&self) -> String {
        format_date(self.gte)
    }

    pub fn lte_string(&self) -> String {
        format_date(self.lte)
    }
}

/// 格式化为 YYYY-MM-DD
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 计算热度窗口对应的日期区间
pub fn get_trend_date_range(trend: TrendOption, clock: &dyn Clock) -> TrendWindow {
    let today = clock.today();
    trend_window_from(trend, today)
}

/// 基于给定的 "今天" 计算窗口
pub fn trend_window_from(trend: TrendOption, today: NaiveDate) -> TrendWindow {
    let gte = match trend {
        TrendOption::Recent => today - Duration::days(7),
        TrendOption::Month => today - Duration::days(30),
        // 2 月 29 日回退一年时落在 2 月 28 日
        TrendOption::Year => today
            .checked_sub_months(Months::new(12))
            .unwrap_or(today - Duration::days(365)),
    };

    TrendWindow { gte, lte: today }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_recent_window() {
        let clock = FixedClock(date("2024-03-15"));
        let window = get_trend_date_range(TrendOption::Recent, &clock);
        assert_eq!(window.gte_string(), "2024-03-08");
        assert_eq!(window.lte_string(), "2024-03-15");
    }

    #[test]
    fn test_month_window_crosses_month_boundary() {
        let clock = FixedClock(date("2024-03-15"));
        let window = get_trend_date_range(TrendOption::Month, &clock);
        assert_eq!(window.gte_string(), "2024-02-14");
        assert_eq!(window.lte_string(), "2024-03-15");
    }

    #[test]
    fn test_year_window() {
        let clock = FixedClock(date("2024-03-15"));
        let window = get_trend_date_range(TrendOption::Year, &clock);
        assert_eq!(window.gte_string(), "2023-03-15");
        assert_eq!(window.lte_string(), "2024-03-15");
    }

    #[test]
    fn test_year_window_from_leap_day() {
        let window = trend_window_from(TrendOption::Year, date("2024-02-29"));
        assert_eq!(window.gte, date("2023-02-28"));
    }

    #[test]
    fn test_system_clock_is_local_today() {
        let today = SystemClock.today();
        let window = get_trend_date_range(TrendOption::Recent, &SystemClock);
        assert!(window.lte >= today);
    }
}
