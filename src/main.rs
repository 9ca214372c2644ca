//! 股票行情查询 API
//!
//! 基于 Supabase 日线行情表的只读 HTTP 服务：历史日线、股票代码列表、单只股票的日内摘要

mod config;   // 配置加载
mod error;    // 错误类型及 HTTP 映射
mod handlers; // HTTP 请求处理器
mod models;   // 请求/响应模型
mod services; // 数据源访问和查询逻辑

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::handlers::AppState;
use crate::services::{MarketClock, PriceStore, SupabaseStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 没有 .env 文件时忽略
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));

    match &config.source {
        Some(path) => log::info!("Loaded configuration from {}", path),
        None => log::info!("Using default configuration"),
    }
    config.validate()?;
    let timezone = config.market_timezone()?;
    let store: Arc<dyn PriceStore> = Arc::new(SupabaseStore::new(&config.store)?);
    let state = web::Data::new(AppState::new(store, MarketClock::new(timezone)));

    log::info!(
        "Starting stock query API on {} (table: {}, market timezone: {})",
        config.bind_addr(),
        config.store.table,
        timezone.name()
    );

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(handlers::config)
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(config.bind_addr())?.run().await?;
    Ok(())
}
