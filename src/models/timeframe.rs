//! 时间序列接口的回看区间

use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// 由 `timeframe` 参数选择的回看区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    YearToDate,
    OneYear,
    FiveYears,
}

/// 不支持的时间区间
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid timeframe: {0}. Valid options are 1D, 5D, 1M, 3M, 6M, YTD, 1Y, 5Y.")]
pub struct InvalidTimeframe(pub String);

/// 闭区间日期范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Timeframe {
    pub const ALL: [Timeframe; 8] = [
        Timeframe::OneDay,
        Timeframe::FiveDays,
        Timeframe::OneMonth,
        Timeframe::ThreeMonths,
        Timeframe::SixMonths,
        Timeframe::YearToDate,
        Timeframe::OneYear,
        Timeframe::FiveYears,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "1D",
            Timeframe::FiveDays => "5D",
            Timeframe::OneMonth => "1M",
            Timeframe::ThreeMonths => "3M",
            Timeframe::SixMonths => "6M",
            Timeframe::YearToDate => "YTD",
            Timeframe::OneYear => "1Y",
            Timeframe::FiveYears => "5Y",
        }
    }

    /// 从 `today` 回看的天数
    ///
    /// YTD 为当年 1 月 1 日至今的天数
    pub fn lookback_days(&self, today: NaiveDate) -> i64 {
        match self {
            Timeframe::OneDay => 1,
            Timeframe::FiveDays => 5,
            Timeframe::OneMonth => 30,
            Timeframe::ThreeMonths => 90,
            Timeframe::SixMonths => 180,
            Timeframe::YearToDate => {
                let jan_first = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                (today - jan_first).num_days()
            }
            Timeframe::OneYear => 365,
            Timeframe::FiveYears => 1825,
        }
    }

    /// 计算 `[today - N 天, today]`
    pub fn date_range(&self, today: NaiveDate) -> DateRange {
        let start = today
            .checked_sub_signed(Duration::days(self.lookback_days(today)))
            .unwrap_or(NaiveDate::MIN);
        DateRange { start, end: today }
    }
}

// 缺省为一个月
impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::OneMonth
    }
}

impl FromStr for Timeframe {
    type Err = InvalidTimeframe;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s)
            .ok_or_else(|| InvalidTimeframe(s.to_string()))
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
