//! 市场日历时钟
//!
//! “今天”指配置的市场时区中的日期

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy)]
pub struct MarketClock {
    timezone: Tz,
    pinned: Option<NaiveDate>,
}

impl MarketClock {
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            pinned: None,
        }
    }

    /// 固定返回 `date` 的时钟
    #[cfg(test)]
    pub fn fixed(date: NaiveDate) -> Self {
        Self {
            timezone: chrono_tz::UTC,
            pinned: Some(date),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.pinned
            .unwrap_or_else(|| Utc::now().with_timezone(&self.timezone).date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(MarketClock::fixed(date).today(), date);
    }

    #[test]
    fn test_zone_clock_is_within_a_day_of_utc() {
        let utc_today = Utc::now().date_naive();
        for tz in [chrono_tz::Pacific::Kiritimati, chrono_tz::Pacific::Pago_Pago] {
            let diff = (MarketClock::new(tz).today() - utc_today).num_days();
            assert!(diff.abs() <= 1);
        }
    }
}
