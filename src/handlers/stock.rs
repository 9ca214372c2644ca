//! 股票接口处理器
//!
//! - GET /api/stock-data?Symbol=AAPL&timeframe=1M 区间内的日线
//! - GET /api/available-symbols 去重后的股票代码
//! - GET /api/stock-summary?Symbol=AAPL 最新价格和日内涨跌

use actix_web::{web, HttpResponse};

use super::AppState;
use crate::error::QueryError;
use crate::models::{StockDataQuery, StockSummaryQuery};
use crate::services::stock_service;

pub async fn get_stock_data(
    state: web::Data<AppState>,
    query: web::Query<StockDataQuery>,
) -> Result<HttpResponse, QueryError> {
    let today = state.clock.today();
    let bars = stock_service::get_stock_data(state.store.as_ref(), &query, today).await?;
    Ok(HttpResponse::Ok().json(bars))
}

pub async fn get_available_symbols(state: web::Data<AppState>) -> Result<HttpResponse, QueryError> {
    let symbols = stock_service::get_available_symbols(state.store.as_ref()).await?;
    Ok(HttpResponse::Ok().json(symbols))
}

pub async fn get_stock_summary(
    state: web::Data<AppState>,
    query: web::Query<StockSummaryQuery>,
) -> Result<HttpResponse, QueryError> {
    let summary = stock_service::get_stock_summary(state.store.as_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(summary))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/stock-data", web::get().to(get_stock_data))
        .route("/available-symbols", web::get().to(get_available_symbols))
        .route("/stock-summary", web::get().to(get_stock_summary));
}
