//! 服务层
//!
//! 数据源访问以及各接口的查询逻辑

pub mod clock;
pub mod decode;
pub mod stock_service;
pub mod store;
pub mod supabase;

#[cfg(test)]
pub mod memory;

pub use clock::MarketClock;
pub use store::PriceStore;
pub use supabase::SupabaseStore;
