//! 行数据转换
//!
//! 数据源返回的是弱类型 JSON：价格可能是数字或数字字符串，成交量可能是浮点数。
//! 所有字段在进入响应前都在这里转换。

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

use super::store::{Row, COL_CLOSE, COL_DATE, COL_HIGH, COL_LOW, COL_OPEN, COL_VOLUME};
use crate::models::PriceBar;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("missing column {0}")]
    Missing(&'static str),

    #[error("column {column} is not a valid {expected}: {value}")]
    Invalid {
        column: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// 转换失败的行及其在响应中的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub index: usize,
    pub reason: CoercionError,
}

/// 宽松解析的结果：可用的日线，以及被丢弃的行和原因
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    pub bars: Vec<PriceBar>,
    pub skipped: Vec<SkippedRow>,
}

fn field<'a>(row: &'a Row, column: &'static str) -> Result<&'a Value, CoercionError> {
    match row.get(column) {
        None | Some(Value::Null) => Err(CoercionError::Missing(column)),
        Some(value) => Ok(value),
    }
}

fn invalid(column: &'static str, expected: &'static str, value: &Value) -> CoercionError {
    CoercionError::Invalid {
        column,
        expected,
        value: value.to_string(),
    }
}

/// 价格列转为 `f64`，接受数字和数字字符串
pub fn coerce_price(row: &Row, column: &'static str) -> Result<f64, CoercionError> {
    let value = field(row, column)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|p| p.is_finite())
        .ok_or_else(|| invalid(column, "number", value))
}

/// 成交量列转为非负整数
///
/// 浮点数向零截断，负数视为无效；字符串必须是整数
pub fn coerce_volume(row: &Row, column: &'static str) -> Result<u64, CoercionError> {
    let value = field(row, column)?;
    let parsed = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && *f < u64::MAX as f64)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(column, "non-negative integer", value))
}

/// 日期列，接受 `YYYY-MM-DD` 及以其开头的时间戳
pub fn coerce_date(row: &Row, column: &'static str) -> Result<NaiveDate, CoercionError> {
    let value = field(row, column)?;
    value
        .as_str()
        .and_then(|s| s.get(..10))
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .ok_or_else(|| invalid(column, "date", value))
}

/// 将单行解析为 `PriceBar`
pub fn decode_bar(row: &Row) -> Result<PriceBar, CoercionError> {
    Ok(PriceBar {
        date: coerce_date(row, COL_DATE)?,
        open: coerce_price(row, COL_OPEN)?,
        high: coerce_price(row, COL_HIGH)?,
        low: coerce_price(row, COL_LOW)?,
        close: coerce_price(row, COL_CLOSE)?,
        volume: coerce_volume(row, COL_VOLUME)?,
    })
}

/// 逐行解析，保持输入顺序并记录失败的行
pub fn decode_bars(rows: &[Row]) -> Decoded {
    let mut decoded = Decoded::default();
    for (index, row) in rows.iter().enumerate() {
        match decode_bar(row) {
            Ok(bar) => decoded.bars.push(bar),
            Err(reason) => decoded.skipped.push(SkippedRow { index, reason }),
        }
    }
    decoded
}
