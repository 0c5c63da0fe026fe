//! Binance Market Data Service
//!
//! Public REST market data for Binance spot and USDⓈ-M futures:
//! - Historical candle data (klines)
//! - Order book depth with the last traded price
//! - Tradable symbol discovery (exchangeInfo)

use super::payloads::{
    RawDepth, RawExchangeInfo, RawPriceTicker, parse_klines, parse_levels, parse_number,
    parse_tickers,
};
use crate::config::BinanceConfig;
use crate::domain::errors::MarketDataError;
use crate::domain::market::{
    CandleQuery, CandleSeries, InstrumentKind, OrderBookSnapshot, TickerInfo,
};
use crate::domain::ports::MarketDataProvider;
use crate::infrastructure::http_client_factory::HttpClientFactory;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

pub struct BinanceMarketDataService {
    client: ClientWithMiddleware,
    spot_base_url: String,
    futures_base_url: String,
}

impl BinanceMarketDataService {
    pub fn builder() -> BinanceMarketDataServiceBuilder {
        BinanceMarketDataServiceBuilder::default()
    }

    pub fn from_config(config: &BinanceConfig) -> Self {
        Self::builder().config(config.clone()).build()
    }

    fn endpoint(&self, kind: InstrumentKind, path: &str) -> String {
        match kind {
            InstrumentKind::Spot => format!("{}/api/v3/{}", self.spot_base_url, path),
            InstrumentKind::Futures => format!("{}/fapi/v1/{}", self.futures_base_url, path),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        kind: InstrumentKind,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let endpoint = self.endpoint(kind, path);
        let url = Url::parse_with_params(&endpoint, params)
            .with_context(|| format!("Invalid Binance URL {}", endpoint))?;

        debug!("BinanceMarketDataService: GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to reach Binance {} ({})", path, kind))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::RequestFailed {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse Binance {} response ({})", path, kind))
    }
}

#[derive(Default)]
pub struct BinanceMarketDataServiceBuilder {
    config: Option<BinanceConfig>,
    spot_base_url: Option<String>,
    futures_base_url: Option<String>,
}

impl BinanceMarketDataServiceBuilder {
    pub fn config(mut self, config: BinanceConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn spot_base_url(mut self, url: String) -> Self {
        self.spot_base_url = Some(url);
        self
    }

    pub fn futures_base_url(mut self, url: String) -> Self {
        self.futures_base_url = Some(url);
        self
    }

    pub fn build(self) -> BinanceMarketDataService {
        let config = self.config.unwrap_or_default();
        let client = HttpClientFactory::create_client(&config);

        let trim = |url: String| url.trim_end_matches('/').to_string();

        BinanceMarketDataService {
            client,
            spot_base_url: trim(self.spot_base_url.unwrap_or(config.spot_base_url)),
            futures_base_url: trim(self.futures_base_url.unwrap_or(config.futures_base_url)),
        }
    }
}

#[async_trait]
impl MarketDataProvider for BinanceMarketDataService {
    async fn fetch_candles(&self, query: &CandleQuery) -> Result<CandleSeries> {
        query.validate()?;

        let mut params = vec![
            ("symbol", query.symbol.clone()),
            ("interval", query.interval.as_str().to_string()),
        ];
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(start) = query.start_time {
            params.push(("startTime", start.timestamp_millis().to_string()));
        }
        if let Some(end) = query.end_time {
            params.push(("endTime", end.timestamp_millis().to_string()));
        }

        // Binance klines format: [[openTime, "open", "high", ...], ...]
        let rows: Vec<Vec<Value>> = self.get_json(query.kind, "klines", &params).await?;
        let candles = parse_klines(&query.symbol, &rows)?;

        info!(
            "BinanceMarketDataService: Fetched {} {} bars for {} ({})",
            candles.len(),
            query.interval,
            query.symbol,
            query.kind
        );

        Ok(CandleSeries::from_query(query, candles)?)
    }

    async fn fetch_order_book(
        &self,
        symbol: &str,
        kind: InstrumentKind,
        depth_limit: u32,
    ) -> Result<OrderBookSnapshot> {
        if symbol.trim().is_empty() || depth_limit == 0 {
            return Err(MarketDataError::InvalidQuery {
                reason: format!(
                    "order book needs a symbol and a positive depth (got '{}', {})",
                    symbol, depth_limit
                ),
            }
            .into());
        }

        let depth_params = [("symbol", symbol.to_string()), ("limit", depth_limit.to_string())];
        let price_params = [("symbol", symbol.to_string())];

        let (depth, ticker) = tokio::try_join!(
            self.get_json::<RawDepth>(kind, "depth", &depth_params),
            self.get_json::<RawPriceTicker>(kind, "ticker/price", &price_params),
        )?;

        let snapshot = OrderBookSnapshot {
            symbol: ticker.symbol.clone(),
            kind,
            current_price: parse_number(&ticker.symbol, "price", &ticker.price)?,
            asks: parse_levels(symbol, "asks", &depth.asks)?,
            bids: parse_levels(symbol, "bids", &depth.bids)?,
        };

        debug!(
            "BinanceMarketDataService: Order book for {} ({}): {} asks, {} bids @ {}",
            symbol,
            kind,
            snapshot.asks.len(),
            snapshot.bids.len(),
            snapshot.current_price
        );

        Ok(snapshot)
    }

    async fn fetch_tickers(&self, kind: InstrumentKind) -> Result<Vec<TickerInfo>> {
        info!("BinanceMarketDataService: Fetching {} symbols from exchangeInfo", kind);

        let info: RawExchangeInfo = self.get_json(kind, "exchangeInfo", &[]).await?;
        let tickers = parse_tickers(info)?;

        info!(
            "BinanceMarketDataService: Found {} trading {} symbols",
            tickers.len(),
            kind
        );

        Ok(tickers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_per_market() {
        let service = BinanceMarketDataService::builder()
            .spot_base_url("http://spot.local/".to_string())
            .futures_base_url("http://futures.local".to_string())
            .build();

        assert_eq!(
            service.endpoint(InstrumentKind::Spot, "klines"),
            "http://spot.local/api/v3/klines"
        );
        assert_eq!(
            service.endpoint(InstrumentKind::Futures, "ticker/price"),
            "http://futures.local/fapi/v1/ticker/price"
        );
    }

    #[tokio::test]
    async fn test_invalid_queries_fail_before_any_request() {
        // Unroutable base URL: reaching the network would fail differently
        let service = BinanceMarketDataService::builder()
            .spot_base_url("http://127.0.0.1:9".to_string())
            .build();

        let query = CandleQuery::new(
            "",
            InstrumentKind::Spot,
            crate::domain::market::Interval::OneHour,
        );
        let err = service.fetch_candles(&query).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MarketDataError>(),
            Some(MarketDataError::InvalidQuery { .. })
        ));

        let err = service
            .fetch_order_book("BTCUSDT", InstrumentKind::Spot, 0)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MarketDataError>(),
            Some(MarketDataError::InvalidQuery { .. })
        ));
    }
}
