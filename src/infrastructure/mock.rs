use crate::domain::market::{
    Candle, CandleQuery, CandleSeries, InstrumentKind, OrderBookSnapshot, TickerInfo,
};
use crate::domain::ports::MarketDataProvider;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

/// In-memory market data for tests and offline demos.
///
/// Every fetch can be delayed per symbol and forced to fail. The provider
/// also tracks how many fetches run at once, so callers can check
/// concurrency bounds.
#[derive(Default)]
pub struct MockMarketDataProvider {
    candles: HashMap<(String, InstrumentKind), Vec<Candle>>,
    order_books: HashMap<(String, InstrumentKind), OrderBookSnapshot>,
    tickers: HashMap<InstrumentKind, Vec<TickerInfo>>,
    latencies: HashMap<String, Duration>,
    failing: HashSet<String>,
    stats: Arc<FetchStats>,
}

/// Counters shared by every fetch of one provider
#[derive(Debug, Default)]
pub struct FetchStats {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    total: AtomicUsize,
}

impl FetchStats {
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    fn enter(self: &Arc<Self>) -> InFlightGuard {
        self.total.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(Arc::clone(self))
    }
}

struct InFlightGuard(Arc<FetchStats>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candles(
        mut self,
        symbol: impl Into<String>,
        kind: InstrumentKind,
        candles: Vec<Candle>,
    ) -> Self {
        self.candles.insert((symbol.into(), kind), candles);
        self
    }

    pub fn with_order_book(mut self, book: OrderBookSnapshot) -> Self {
        self.order_books.insert((book.symbol.clone(), book.kind), book);
        self
    }

    pub fn with_tickers(mut self, kind: InstrumentKind, tickers: Vec<TickerInfo>) -> Self {
        self.tickers.insert(kind, tickers);
        self
    }

    /// Delays every fetch for `symbol`
    pub fn with_latency(mut self, symbol: impl Into<String>, latency: Duration) -> Self {
        self.latencies.insert(symbol.into(), latency);
        self
    }

    /// Makes every fetch for `symbol` fail after its latency
    pub fn with_failure(mut self, symbol: impl Into<String>) -> Self {
        self.failing.insert(symbol.into());
        self
    }

    pub fn stats(&self) -> Arc<FetchStats> {
        Arc::clone(&self.stats)
    }

    async fn simulate(&self, symbol: &str) -> Result<()> {
        if let Some(latency) = self.latencies.get(symbol) {
            tokio::time::sleep(*latency).await;
        }
        if self.failing.contains(symbol) {
            return Err(anyhow!("Simulated upstream failure for {}", symbol));
        }
        Ok(())
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketDataProvider {
    async fn fetch_candles(&self, query: &CandleQuery) -> Result<CandleSeries> {
        let _guard = self.stats.enter();
        query.validate()?;
        self.simulate(&query.symbol).await?;

        let stored = self
            .candles
            .get(&(query.symbol.clone(), query.kind))
            .ok_or_else(|| anyhow!("No candles for {} ({})", query.symbol, query.kind))?;

        let start = query.start_time.map(|t| t.timestamp_millis());
        let end = query.end_time.map(|t| t.timestamp_millis());
        let mut candles: Vec<Candle> = stored
            .iter()
            .filter(|c| start.is_none_or(|s| c.open_time >= s))
            .filter(|c| end.is_none_or(|e| c.open_time <= e))
            .cloned()
            .collect();

        // Like the exchange: earliest bars from a start time, latest bars otherwise
        if let Some(limit) = query.limit.map(|l| l as usize)
            && candles.len() > limit
        {
            if start.is_some() {
                candles.truncate(limit);
            } else {
                candles.drain(..candles.len() - limit);
            }
        }

        debug!(
            "MockMarketDataProvider: Serving {} candles for {}",
            candles.len(),
            query.symbol
        );

        Ok(CandleSeries::from_query(query, candles)?)
    }

    async fn fetch_order_book(
        &self,
        symbol: &str,
        kind: InstrumentKind,
        depth_limit: u32,
    ) -> Result<OrderBookSnapshot> {
        let _guard = self.stats.enter();
        self.simulate(symbol).await?;

        let mut book = self
            .order_books
            .get(&(symbol.to_string(), kind))
            .cloned()
            .ok_or_else(|| anyhow!("No order book for {} ({})", symbol, kind))?;

        book.asks.truncate(depth_limit as usize);
        book.bids.truncate(depth_limit as usize);
        Ok(book)
    }

    async fn fetch_tickers(&self, kind: InstrumentKind) -> Result<Vec<TickerInfo>> {
        let _guard = self.stats.enter();
        Ok(self
            .tickers
            .get(&kind)
            .map(|tickers| tickers.iter().filter(|t| t.is_trading()).cloned().collect())
            .unwrap_or_default())
    }
}
