//! Raw Binance REST payloads and their conversion into domain types.
//!
//! Binance sends prices and quantities as JSON strings. Every numeric field
//! is parsed and validated here; a malformed value fails the whole payload
//! instead of being skipped or zeroed.

use crate::domain::errors::MarketDataError;
use crate::domain::market::{Candle, PriceLevel, SymbolStatus, TickerInfo};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

/// `GET /api/v3/depth` and `GET /fapi/v1/depth`
#[derive(Debug, Deserialize)]
pub struct RawDepth {
    pub bids: Vec<[String; 2]>,
    pub asks: Vec<[String; 2]>,
}

/// `GET /api/v3/ticker/price` and `GET /fapi/v1/ticker/price`
#[derive(Debug, Deserialize)]
pub struct RawPriceTicker {
    pub symbol: String,
    pub price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSymbolFilter {
    pub filter_type: String,
    pub tick_size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawSymbolInfo {
    pub symbol: String,
    pub status: String,
    #[serde(default)]
    pub filters: Vec<RawSymbolFilter>,
}

/// `GET /api/v3/exchangeInfo` and `GET /fapi/v1/exchangeInfo`
#[derive(Debug, Deserialize)]
pub struct RawExchangeInfo {
    pub symbols: Vec<RawSymbolInfo>,
}

fn invalid(symbol: &str, reason: impl Into<String>) -> MarketDataError {
    MarketDataError::InvalidData {
        symbol: symbol.to_string(),
        reason: reason.into(),
    }
}

/// Parses a decimal string into a finite f64
pub fn parse_number(symbol: &str, field: &str, raw: &str) -> Result<f64, MarketDataError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid(symbol, format!("{} '{}' is not a number: {}", field, raw, e)))?;

    if !value.is_finite() {
        return Err(invalid(symbol, format!("{} '{}' is not finite", field, raw)));
    }
    Ok(value)
}

fn string_field<'a>(
    symbol: &str,
    row: &'a [Value],
    index: usize,
    field: &str,
) -> Result<&'a str, MarketDataError> {
    row.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(symbol, format!("kline field {} ({}) missing or not a string", index, field)))
}

fn integer_field(
    symbol: &str,
    row: &[Value],
    index: usize,
    field: &str,
) -> Result<i64, MarketDataError> {
    row.get(index)
        .and_then(Value::as_i64)
        .ok_or_else(|| invalid(symbol, format!("kline field {} ({}) missing or not an integer", index, field)))
}

/// Binance kline row:
/// `[openTime, open, high, low, close, volume, closeTime, quoteVolume, trades,
///   takerBuyBase, takerBuyQuote, ignore]`
pub fn parse_kline(symbol: &str, row: &[Value]) -> Result<Candle, MarketDataError> {
    if row.len() < 11 {
        return Err(invalid(
            symbol,
            format!("kline row has {} fields, expected at least 11", row.len()),
        ));
    }

    let number = |index: usize, field: &str| -> Result<f64, MarketDataError> {
        parse_number(symbol, field, string_field(symbol, row, index, field)?)
    };

    let open_time = integer_field(symbol, row, 0, "openTime")?;
    let close_time = integer_field(symbol, row, 6, "closeTime")?;
    if open_time >= close_time {
        return Err(invalid(
            symbol,
            format!("kline openTime {} is not before closeTime {}", open_time, close_time),
        ));
    }

    let trades = row
        .get(8)
        .and_then(Value::as_u64)
        .ok_or_else(|| invalid(symbol, "kline field 8 (trades) missing or not an integer"))?;

    Ok(Candle {
        open_time,
        open: number(1, "open")?,
        high: number(2, "high")?,
        low: number(3, "low")?,
        close: number(4, "close")?,
        volume: number(5, "volume")?,
        close_time,
        quote_volume: number(7, "quoteVolume")?,
        trades,
        base_asset_volume: number(9, "takerBuyBaseVolume")?,
        quote_asset_volume: number(10, "takerBuyQuoteVolume")?,
    })
}

pub fn parse_klines(symbol: &str, rows: &[Vec<Value>]) -> Result<Vec<Candle>, MarketDataError> {
    rows.iter().map(|row| parse_kline(symbol, row)).collect()
}

pub fn parse_levels(
    symbol: &str,
    side: &str,
    raw: &[[String; 2]],
) -> Result<Vec<PriceLevel>, MarketDataError> {
    raw.iter()
        .map(|[price, quantity]| {
            let price = parse_number(symbol, side, price)?;
            let quantity = parse_number(symbol, side, quantity)?;
            if price <= 0.0 {
                return Err(invalid(symbol, format!("{} level with non-positive price {}", side, price)));
            }
            if quantity < 0.0 {
                return Err(invalid(symbol, format!("{} level with negative quantity {}", side, quantity)));
            }
            Ok(PriceLevel::new(price, quantity))
        })
        .collect()
}

/// Converts exchangeInfo into ticker infos, keeping only trading symbols
pub fn parse_tickers(info: RawExchangeInfo) -> Result<Vec<TickerInfo>, MarketDataError> {
    info.symbols
        .into_iter()
        .filter(|s| SymbolStatus::from(s.status.as_str()) == SymbolStatus::Trading)
        .map(|s| {
            let raw_tick = s
                .filters
                .iter()
                .find(|f| f.filter_type == "PRICE_FILTER")
                .and_then(|f| f.tick_size.as_deref())
                .ok_or_else(|| invalid(&s.symbol, "PRICE_FILTER tickSize missing"))?;

            let tick_size = Decimal::from_str(raw_tick.trim())
                .map_err(|e| invalid(&s.symbol, format!("tickSize '{}': {}", raw_tick, e)))?;

            Ok(TickerInfo {
                status: SymbolStatus::from(s.status.as_str()),
                symbol: s.symbol,
                tick_size,
            })
        })
        .collect()
}
