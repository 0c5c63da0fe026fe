use crate::domain::market::{CandleQuery, CandleSeries, InstrumentKind, OrderBookSnapshot, TickerInfo};
use anyhow::Result;
use async_trait::async_trait;

/// Source of candles and order books the analytics run on
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_candles(&self, query: &CandleQuery) -> Result<CandleSeries>;

    /// Order book plus the instrument's last price
    async fn fetch_order_book(
        &self,
        symbol: &str,
        kind: InstrumentKind,
        depth_limit: u32,
    ) -> Result<OrderBookSnapshot>;

    /// Symbols currently trading on the given market
    async fn fetch_tickers(&self, kind: InstrumentKind) -> Result<Vec<TickerInfo>>;
}
