//! 股票查询服务
//!
//! 校验请求参数，查询行情表，并把原始行整理成响应模型

use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeSet;

use super::decode::{coerce_price, coerce_volume, decode_bars, Decoded};
use super::store::{
    Direction, PriceStore, RowQuery, COL_CLOSE, COL_DATE, COL_HIGH, COL_LOW, COL_OPEN,
    COL_SYMBOL, COL_VOLUME,
};
use crate::error::QueryError;
use crate::models::{
    DateRange, InvalidTimeframe, PriceBar, StockDataQuery, StockSummary, StockSummaryQuery,
    Timeframe,
};

const STOCK_DATA_FAILED: &str = "Failed to fetch stock data";
const SYMBOLS_FAILED: &str = "Failed to fetch available symbols";
const SUMMARY_FAILED: &str = "Failed to fetch stock summary";

/// 去空白并转大写；缺失或为空时返回参数错误
pub fn normalize_symbol(raw: Option<&str>) -> Result<String, QueryError> {
    let symbol = raw.unwrap_or_default().trim().to_uppercase();
    if symbol.is_empty() {
        return Err(QueryError::Validation(
            "Symbol parameter is required".to_string(),
        ));
    }
    Ok(symbol)
}

/// 解析 `timeframe` 参数，缺省时使用默认区间
pub fn parse_timeframe(raw: Option<&str>) -> Result<Timeframe, QueryError> {
    match raw {
        None => Ok(Timeframe::default()),
        Some(token) => token
            .trim()
            .parse()
            .map_err(|e: InvalidTimeframe| QueryError::Validation(e.to_string())),
    }
}

fn not_found(symbol: &str) -> QueryError {
    QueryError::NotFound(format!("No data found for symbol {}", symbol))
}

/// 查询 `symbol` 在 `range` 内的日线，按日期升序，并报告无法解析的行
pub async fn fetch_price_bars(
    store: &dyn PriceStore,
    symbol: &str,
    range: DateRange,
) -> Result<Decoded, QueryError> {
    let query = RowQuery::select(&[
        COL_DATE, COL_SYMBOL, COL_OPEN, COL_HIGH, COL_LOW, COL_CLOSE, COL_VOLUME,
    ])
    .eq(COL_SYMBOL, symbol)
    .gte(COL_DATE, range.start.to_string())
    .lte(COL_DATE, range.end.to_string())
    .order_by(COL_DATE, Direction::Asc);

    let rows = store
        .select(&query)
        .await
        .map_err(|e| QueryError::backend(STOCK_DATA_FAILED, e))?;

    if rows.is_empty() {
        return Err(not_found(symbol));
    }

    let mut decoded = decode_bars(&rows);
    for skipped in &decoded.skipped {
        log::warn!(
            "Dropping row {} for {}: {}",
            skipped.index,
            symbol,
            skipped.reason
        );
    }

    // 数据源返回的行不一定都落在区间内
    decoded.bars.retain(|bar| {
        let inside = range.contains(bar.date);
        if !inside {
            log::warn!(
                "Dropping bar {} for {}: outside {} to {}",
                bar.date,
                symbol,
                range.start,
                range.end
            );
        }
        inside
    });
    Ok(decoded)
}

/// `GET /api/stock-data`
pub async fn get_stock_data(
    store: &dyn PriceStore,
    query: &StockDataQuery,
    today: NaiveDate,
) -> Result<Vec<PriceBar>, QueryError> {
    let symbol = normalize_symbol(query.symbol.as_deref())?;
    let timeframe = parse_timeframe(query.timeframe.as_deref())?;
    let range = timeframe.date_range(today);

    log::info!(
        "Fetching data for symbol: {}, timeframe: {}, start_date: {}, end_date: {}",
        symbol,
        timeframe,
        range.start,
        range.end
    );

    let decoded = fetch_price_bars(store, &symbol, range).await?;
    Ok(decoded.bars)
}

/// `GET /api/available-symbols`：去重并排序后的代码列表
pub async fn get_available_symbols(store: &dyn PriceStore) -> Result<Vec<String>, QueryError> {
    let rows = store
        .select(&RowQuery::select(&[COL_SYMBOL]).order_by(COL_SYMBOL, Direction::Asc))
        .await
        .map_err(|e| QueryError::backend(SYMBOLS_FAILED, e))?;

    log::debug!("Symbol catalog returned {} rows", rows.len());

    let mut symbols = BTreeSet::new();
    for row in &rows {
        match row.get(COL_SYMBOL) {
            Some(Value::String(symbol)) => {
                symbols.insert(symbol.clone());
            }
            other => log::warn!("Ignoring non-string symbol value: {:?}", other),
        }
    }

    if symbols.is_empty() {
        return Err(QueryError::NotFound("No symbols found".to_string()));
    }
    Ok(symbols.into_iter().collect())
}

/// 保留两位小数，恰好在中点时取偶数
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// 相对前收盘价的涨跌额和涨跌幅，均保留两位小数。
/// 前收盘价为 0 时涨跌幅为 0。
pub fn day_over_day(latest_close: f64, prev_close: f64) -> (f64, f64) {
    let change = latest_close - prev_close;
    let percent = if prev_close != 0.0 {
        change / prev_close * 100.0
    } else {
        0.0
    };
    (round2(change), round2(percent))
}

/// `GET /api/stock-summary`
pub async fn get_stock_summary(
    store: &dyn PriceStore,
    query: &StockSummaryQuery,
) -> Result<StockSummary, QueryError> {
    let symbol = normalize_symbol(query.symbol.as_deref())?;
    log::info!("Fetching summary for symbol: {}", symbol);

    let latest_query = RowQuery::select(&[
        COL_DATE, COL_OPEN, COL_HIGH, COL_LOW, COL_CLOSE, COL_VOLUME,
    ])
    .eq(COL_SYMBOL, symbol.as_str())
    .order_by(COL_DATE, Direction::Desc)
    .limit(1);

    let latest_rows = store
        .select(&latest_query)
        .await
        .map_err(|e| QueryError::backend(SUMMARY_FAILED, e))?;
    let latest = latest_rows.first().ok_or_else(|| not_found(&symbol))?;

    let latest_date = latest
        .get(COL_DATE)
        .and_then(Value::as_str)
        .ok_or_else(|| QueryError::backend(SUMMARY_FAILED, "latest row has no Date"))?;
    let latest_close =
        coerce_price(latest, COL_CLOSE).map_err(|e| QueryError::backend(SUMMARY_FAILED, e))?;
    let day_high =
        coerce_price(latest, COL_HIGH).map_err(|e| QueryError::backend(SUMMARY_FAILED, e))?;
    let day_low =
        coerce_price(latest, COL_LOW).map_err(|e| QueryError::backend(SUMMARY_FAILED, e))?;
    let volume =
        coerce_volume(latest, COL_VOLUME).map_err(|e| QueryError::backend(SUMMARY_FAILED, e))?;

    let prev_query = RowQuery::select(&[COL_CLOSE])
        .eq(COL_SYMBOL, symbol.as_str())
        .lt(COL_DATE, latest_date)
        .order_by(COL_DATE, Direction::Desc)
        .limit(1);

    let prev_rows = store
        .select(&prev_query)
        .await
        .map_err(|e| QueryError::backend(SUMMARY_FAILED, e))?;

    // 只有一个交易日时与自身比较
    let prev_close = match prev_rows.first() {
        Some(prev) => {
            coerce_price(prev, COL_CLOSE).map_err(|e| QueryError::backend(SUMMARY_FAILED, e))?
        }
        None => latest_close,
    };

    let (daily_change, daily_change_percent) = day_over_day(latest_close, prev_close);

    Ok(StockSummary {
        symbol,
        latest_price: latest_close,
        daily_change,
        daily_change_percent,
        day_high,
        day_low,
        volume,
    })
}
