pub mod response;
pub mod stock;
pub mod timeframe;

pub use response::*;
pub use stock::*;
pub use timeframe::*;
