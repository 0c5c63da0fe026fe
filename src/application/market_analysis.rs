use crate::config::AnalyticsConfig;
use crate::domain::analytics::{
    DensityResult, InclinedLine, PumpDumpResult, TrendResult, compute_density,
    compute_inclined_line, compute_trend, detect_pumps_dumps,
};
use crate::domain::market::{CandleQuery, InstrumentKind, TickerInfo};
use crate::domain::ports::MarketDataProvider;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Fetches data for a single instrument and runs one analysis over it,
/// using the configured coefficients and book depth.
pub struct MarketAnalysisService {
    provider: Arc<dyn MarketDataProvider>,
    config: AnalyticsConfig,
}

impl MarketAnalysisService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: AnalyticsConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub async fn density(&self, symbol: &str, kind: InstrumentKind) -> Result<DensityResult> {
        let book = self
            .provider
            .fetch_order_book(symbol, kind, self.config.order_book_depth)
            .await
            .with_context(|| format!("Failed to fetch order book for {}", symbol))?;

        let density = compute_density(&book, self.config.density_coefficient)
            .with_context(|| format!("Density analysis failed for {}", symbol))?;

        info!(
            "MarketAnalysisService: {} density: {} ask / {} bid walls (coef {})",
            symbol,
            density.asks.levels.len(),
            density.bids.levels.len(),
            self.config.density_coefficient
        );
        Ok(density)
    }

    pub async fn trend(&self, query: &CandleQuery) -> Result<TrendResult> {
        let series = self
            .provider
            .fetch_candles(query)
            .await
            .with_context(|| format!("Failed to fetch candles for {}", query.symbol))?;

        compute_trend(&series).with_context(|| format!("Trend analysis failed for {}", query.symbol))
    }

    pub async fn pumps_dumps(&self, query: &CandleQuery) -> Result<PumpDumpResult> {
        let series = self
            .provider
            .fetch_candles(query)
            .await
            .with_context(|| format!("Failed to fetch candles for {}", query.symbol))?;

        let result = detect_pumps_dumps(&series, self.config.pump_dump_coefficient)
            .with_context(|| format!("Pump/dump detection failed for {}", query.symbol))?;

        info!(
            "MarketAnalysisService: {} has {} pumps and {} dumps over {} candles",
            query.symbol,
            result.pumps.len(),
            result.dumps.len(),
            series.len()
        );
        Ok(result)
    }

    pub async fn inclined_line(&self, query: &CandleQuery) -> Result<InclinedLine> {
        let series = self
            .provider
            .fetch_candles(query)
            .await
            .with_context(|| format!("Failed to fetch candles for {}", query.symbol))?;

        let pumps_dumps = detect_pumps_dumps(&series, self.config.pump_dump_coefficient)
            .with_context(|| format!("Pump/dump detection failed for {}", query.symbol))?;

        compute_inclined_line(&series, &pumps_dumps)
            .with_context(|| format!("No inclined line for {}", query.symbol))
    }

    pub async fn tickers(&self, kind: InstrumentKind) -> Result<Vec<TickerInfo>> {
        self.provider
            .fetch_tickers(kind)
            .await
            .with_context(|| format!("Failed to fetch {} tickers", kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analytics::{MoveKind, TrendDirection};
    use crate::domain::errors::AnalyticsError;
    use crate::domain::market::{Candle, Interval, OrderBookSnapshot, PriceLevel};
    use crate::infrastructure::mock::MockMarketDataProvider;

    fn create_candle(i: i64, open: f64, close: f64) -> Candle {
        Candle {
            open_time: i * 60_000,
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 1.0,
            close_time: i * 60_000 + 59_999,
            quote_volume: close,
            trades: 1,
            base_asset_volume: 0.5,
            quote_asset_volume: 0.5,
        }
    }

    fn service(provider: MockMarketDataProvider, coefficient: f64) -> MarketAnalysisService {
        let config = AnalyticsConfig {
            density_coefficient: coefficient,
            pump_dump_coefficient: coefficient,
            ..AnalyticsConfig::default()
        };
        MarketAnalysisService::new(Arc::new(provider), config)
    }

    #[tokio::test]
    async fn test_density_uses_configured_coefficient() {
        let provider = MockMarketDataProvider::new().with_order_book(OrderBookSnapshot {
            symbol: "BTCUSDT".to_string(),
            kind: InstrumentKind::Spot,
            current_price: 100.0,
            asks: vec![
                PriceLevel::new(100.0, 1.0),
                PriceLevel::new(101.0, 1.0),
                PriceLevel::new(102.0, 10.0),
            ],
            bids: vec![PriceLevel::new(99.0, 2.0)],
        });

        let density = service(provider, 2.0)
            .density("BTCUSDT", InstrumentKind::Spot)
            .await
            .unwrap();

        assert!((density.asks.average_quantity - 4.0).abs() < 1e-12);
        assert_eq!(density.asks.levels, vec![PriceLevel::new(102.0, 10.0)]);
        // bid average 2.0, threshold 4.0
        assert!(density.bids.levels.is_empty());
    }

    #[tokio::test]
    async fn test_trend_and_pumps_over_fetched_series() {
        let candles = vec![
            create_candle(0, 100.0, 101.0),
            create_candle(1, 101.0, 100.0),
            create_candle(2, 100.0, 120.0),
            create_candle(3, 120.0, 90.0),
        ];
        let provider =
            MockMarketDataProvider::new().with_candles("ETHUSDT", InstrumentKind::Spot, candles);
        let service = service(provider, 1.5);
        let query = CandleQuery::new("ETHUSDT", InstrumentKind::Spot, Interval::OneMin);

        let trend = service.trend(&query).await.unwrap();
        assert_eq!(trend.direction, TrendDirection::Down);
        assert!((trend.percent_change - 10.0).abs() < 1e-9);

        let result = service.pumps_dumps(&query).await.unwrap();
        assert_eq!(result.pumps.len(), 1);
        assert_eq!(result.pumps[0].close, 120.0);
        assert_eq!(result.dumps.len(), 1);
        assert_eq!(result.dumps[0].close, 90.0);

        let line = service.inclined_line(&query).await.unwrap();
        assert_eq!(line.anchor, MoveKind::Dump);
    }

    #[tokio::test]
    async fn test_empty_series_keeps_analytics_error() {
        let provider =
            MockMarketDataProvider::new().with_candles("ETHUSDT", InstrumentKind::Spot, vec![]);
        let query = CandleQuery::new("ETHUSDT", InstrumentKind::Spot, Interval::OneMin);

        let err = service(provider, 3.0).trend(&query).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalyticsError>(),
            Some(AnalyticsError::EmptySeries { .. })
        ));
    }
}
