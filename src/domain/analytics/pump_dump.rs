//! Pump/dump detection: candles whose body move is abnormally large relative
//! to the series average.

use super::percent_change::percent_change;
use crate::domain::errors::AnalyticsError;
use crate::domain::market::{Candle, CandleSeries, InstrumentKind, Interval};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpDumpResult {
    pub symbol: String,
    pub kind: InstrumentKind,
    pub interval: Interval,
    pub limit: Option<u32>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub pumps: Vec<Candle>,
    pub dumps: Vec<Candle>,
}

/// Splits the abnormal candles of `series` into pumps and dumps.
///
/// A candle is abnormal when its unsigned open-to-close percent change is at
/// least `average_change * coefficient`. Abnormal candles with `open < close`
/// are pumps, all others are dumps.
///
/// Flat candles (`open == close`) have a zero change. They qualify whenever
/// the threshold is at most zero: when `coefficient <= 0`, or when every
/// candle of the series is flat so the average change is zero. Qualifying
/// flat candles land in `dumps`.
pub fn detect_pumps_dumps(
    series: &CandleSeries,
    coefficient: f64,
) -> Result<PumpDumpResult, AnalyticsError> {
    if series.candles.is_empty() {
        return Err(AnalyticsError::EmptySeries {
            symbol: series.symbol.clone(),
        });
    }

    let changes = series
        .candles
        .iter()
        .map(|c| percent_change(c.open, c.close, false))
        .collect::<Result<Vec<f64>, _>>()?;

    let average_change = changes.iter().sum::<f64>() / changes.len() as f64;
    let threshold = average_change * coefficient;

    let (pumps, dumps): (Vec<Candle>, Vec<Candle>) = series
        .candles
        .iter()
        .zip(&changes)
        .filter(|(_, change)| **change >= threshold)
        .map(|(candle, _)| candle.clone())
        .partition(|candle| candle.is_bullish());

    Ok(PumpDumpResult {
        symbol: series.symbol.clone(),
        kind: series.kind,
        interval: series.interval,
        limit: series.limit,
        start_time: series.start_time,
        end_time: series.end_time,
        pumps,
        dumps,
    })
}
