pub mod health;
pub mod stock;

use actix_web::{error::QueryPayloadError, web, HttpRequest};
use std::sync::Arc;

use crate::error::QueryError;
use crate::services::{MarketClock, PriceStore};

/// 应用共享状态
pub struct AppState {
    pub store: Arc<dyn PriceStore>,
    pub clock: MarketClock,
}

impl AppState {
    pub fn new(store: Arc<dyn PriceStore>, clock: MarketClock) -> Self {
        Self { store, clock }
    }
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    QueryError::Validation(format!("Invalid query string: {}", err)).into()
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(
            web::scope("/api")
                .configure(health::config)
                .configure(stock::config),
        );
}
