use anyhow::{Result, anyhow};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market an instrument trades on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKind {
    Spot,
    Futures,
}

impl InstrumentKind {
    /// Largest `limit` the venue accepts on a single klines request
    pub fn max_candle_limit(&self) -> u32 {
        match self {
            InstrumentKind::Spot => 1000,
            InstrumentKind::Futures => 1500,
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentKind::Spot => write!(f, "spot"),
            InstrumentKind::Futures => write!(f, "futures"),
        }
    }
}

impl FromStr for InstrumentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spot" => Ok(InstrumentKind::Spot),
            "futures" | "perp" => Ok(InstrumentKind::Futures),
            _ => anyhow::bail!("Invalid instrument kind: {}. Must be 'spot' or 'futures'", s),
        }
    }
}

/// Candle interval, spelled the way the exchange spells it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMin,
    #[serde(rename = "3m")]
    ThreeMin,
    #[serde(rename = "5m")]
    FiveMin,
    #[serde(rename = "15m")]
    FifteenMin,
    #[serde(rename = "30m")]
    ThirtyMin,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    TwoHour,
    #[serde(rename = "4h")]
    FourHour,
    #[serde(rename = "6h")]
    SixHour,
    #[serde(rename = "8h")]
    EightHour,
    #[serde(rename = "12h")]
    TwelveHour,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "3d")]
    ThreeDay,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMin => "1m",
            Interval::ThreeMin => "3m",
            Interval::FiveMin => "5m",
            Interval::FifteenMin => "15m",
            Interval::ThirtyMin => "30m",
            Interval::OneHour => "1h",
            Interval::TwoHour => "2h",
            Interval::FourHour => "4h",
            Interval::SixHour => "6h",
            Interval::EightHour => "8h",
            Interval::TwelveHour => "12h",
            Interval::OneDay => "1d",
            Interval::ThreeDay => "3d",
            Interval::OneWeek => "1w",
            Interval::OneMonth => "1M",
        }
    }

    /// Returns all intervals in ascending order
    pub fn all() -> Vec<Interval> {
        vec![
            Interval::OneMin,
            Interval::ThreeMin,
            Interval::FiveMin,
            Interval::FifteenMin,
            Interval::ThirtyMin,
            Interval::OneHour,
            Interval::TwoHour,
            Interval::FourHour,
            Interval::SixHour,
            Interval::EightHour,
            Interval::TwelveHour,
            Interval::OneDay,
            Interval::ThreeDay,
            Interval::OneWeek,
            Interval::OneMonth,
        ]
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = anyhow::Error;

    // Case-sensitive: "1m" is a minute, "1M" is a month.
    fn from_str(s: &str) -> Result<Self> {
        Interval::all()
            .into_iter()
            .find(|interval| interval.as_str() == s)
            .ok_or_else(|| anyhow!("Invalid interval: {}", s))
    }
}

/// Trading status reported by exchangeInfo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolStatus {
    Trading,
    Settling,
    PendingTrading,
    Break,
    #[serde(untagged)]
    Other(String),
}

impl From<&str> for SymbolStatus {
    fn from(s: &str) -> Self {
        match s {
            "TRADING" => SymbolStatus::Trading,
            "SETTLING" => SymbolStatus::Settling,
            "PENDING_TRADING" => SymbolStatus::PendingTrading,
            "BREAK" => SymbolStatus::Break,
            other => SymbolStatus::Other(other.to_string()),
        }
    }
}

/// A listed symbol together with its price tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerInfo {
    pub symbol: String,
    pub status: SymbolStatus,
    pub tick_size: Decimal,
}

impl TickerInfo {
    pub fn is_trading(&self) -> bool {
        self.status == SymbolStatus::Trading
    }

    /// Number of decimal places implied by the tick size (0.0100 -> 2)
    pub fn price_precision(&self) -> u32 {
        self.tick_size.normalize().scale()
    }
}
