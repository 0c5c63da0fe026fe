use super::instrument::{InstrumentKind, Interval};
use crate::domain::errors::MarketDataError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar. Timestamps are unix milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: i64,
    pub quote_volume: f64,
    pub trades: u64,
    /// Taker buy base asset volume
    pub base_asset_volume: f64,
    /// Taker buy quote asset volume
    pub quote_asset_volume: f64,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.open < self.close
    }
}

/// Parameters of a candle series request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleQuery {
    pub symbol: String,
    pub kind: InstrumentKind,
    pub interval: Interval,
    pub limit: Option<u32>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl CandleQuery {
    pub fn new(symbol: impl Into<String>, kind: InstrumentKind, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            kind,
            interval,
            limit: None,
            start_time: None,
            end_time: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    /// Same interval, limit and range for another symbol
    pub fn for_symbol(&self, symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), MarketDataError> {
        if self.symbol.trim().is_empty() {
            return Err(MarketDataError::InvalidQuery {
                reason: "symbol must not be empty".to_string(),
            });
        }

        if let Some(limit) = self.limit {
            let max = self.kind.max_candle_limit();
            if limit == 0 || limit > max {
                return Err(MarketDataError::InvalidQuery {
                    reason: format!(
                        "limit {} for {} out of range 1..={} ({})",
                        limit, self.symbol, max, self.kind
                    ),
                });
            }
        }

        if let (Some(start), Some(end)) = (self.start_time, self.end_time)
            && start >= end
        {
            return Err(MarketDataError::InvalidQuery {
                reason: format!("start time {} is not before end time {}", start, end),
            });
        }

        Ok(())
    }
}

/// Chronological candles for one instrument, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleSeries {
    pub symbol: String,
    pub kind: InstrumentKind,
    pub interval: Interval,
    pub limit: Option<u32>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    /// Builds a series answering `query`, rejecting candles that break the
    /// series invariants (too many candles, out-of-order open times).
    pub fn from_query(query: &CandleQuery, candles: Vec<Candle>) -> Result<Self, MarketDataError> {
        if let Some(limit) = query.limit
            && candles.len() > limit as usize
        {
            return Err(MarketDataError::InvalidData {
                symbol: query.symbol.clone(),
                reason: format!("received {} candles for limit {}", candles.len(), limit),
            });
        }

        if let Some(pair) = candles.windows(2).find(|w| w[1].open_time < w[0].open_time) {
            return Err(MarketDataError::InvalidData {
                symbol: query.symbol.clone(),
                reason: format!(
                    "candles out of order: {} follows {}",
                    pair[1].open_time, pair[0].open_time
                ),
            });
        }

        Ok(Self {
            symbol: query.symbol.clone(),
            kind: query.kind,
            interval: query.interval,
            limit: query.limit,
            start_time: query.start_time,
            end_time: query.end_time,
            candles,
        })
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle_at(open_time: i64) -> Candle {
        Candle {
            open_time,
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 0.0,
            close_time: open_time + 59_999,
            quote_volume: 0.0,
            trades: 0,
            base_asset_volume: 0.0,
            quote_asset_volume: 0.0,
        }
    }

    #[test]
    fn test_query_validation() {
        let query = CandleQuery::new("BTCUSDT", InstrumentKind::Spot, Interval::OneHour);
        assert!(query.validate().is_ok());

        assert!(query.for_symbol("  ").validate().is_err());
        assert!(query.clone().with_limit(0).validate().is_err());
        assert!(query.clone().with_limit(1001).validate().is_err());

        let futures = CandleQuery::new("BTCUSDT", InstrumentKind::Futures, Interval::OneHour);
        assert!(futures.with_limit(1500).validate().is_ok());

        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(query.with_range(start, end).validate().is_err());
    }

    #[test]
    fn test_series_rejects_excess_candles() {
        let query =
            CandleQuery::new("ETHUSDT", InstrumentKind::Spot, Interval::OneMin).with_limit(1);
        let result = CandleSeries::from_query(&query, vec![candle_at(0), candle_at(60_000)]);
        assert!(matches!(result, Err(MarketDataError::InvalidData { .. })));
    }

    #[test]
    fn test_series_rejects_unordered_candles() {
        let query = CandleQuery::new("ETHUSDT", InstrumentKind::Spot, Interval::OneMin);
        let result = CandleSeries::from_query(&query, vec![candle_at(60_000), candle_at(0)]);
        assert!(result.is_err());

        let ok = CandleSeries::from_query(&query, vec![candle_at(0), candle_at(60_000)]).unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.symbol, "ETHUSDT");
    }
}
