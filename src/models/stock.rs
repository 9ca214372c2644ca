//! 股票数据模型
//!
//! 股票接口的请求参数和响应结构

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 单只股票单个交易日的行情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// 交易日期，序列化为 YYYY-MM-DD
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// 股票最新价格及相对前一交易日的涨跌
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    pub symbol: String,
    pub latest_price: f64,
    /// 保留两位小数
    pub daily_change: f64,
    /// 保留两位小数；前收盘价为 0 时为 0
    pub daily_change_percent: f64,
    pub day_high: f64,
    pub day_low: f64,
    pub volume: u64,
}

/// `GET /api/stock-data` 查询参数
#[derive(Debug, Default, Deserialize)]
pub struct StockDataQuery {
    #[serde(rename = "Symbol", alias = "symbol")]
    pub symbol: Option<String>,
    pub timeframe: Option<String>,
}

/// `GET /api/stock-summary` 查询参数
#[derive(Debug, Default, Deserialize)]
pub struct StockSummaryQuery {
    #[serde(rename = "Symbol", alias = "symbol")]
    pub symbol: Option<String>,
}
