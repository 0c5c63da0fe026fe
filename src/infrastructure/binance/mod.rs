pub mod market_data;
pub mod payloads;

pub use market_data::{BinanceMarketDataService, BinanceMarketDataServiceBuilder};
