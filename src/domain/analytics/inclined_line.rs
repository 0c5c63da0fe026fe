//! Two-point trend line anchored on the most recent pump or dump.

use super::pump_dump::PumpDumpResult;
use crate::domain::errors::AnalyticsError;
use crate::domain::market::{Candle, CandleSeries, InstrumentKind, Interval};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MoveKind {
    Pump,
    Dump,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclinedLine {
    pub symbol: String,
    pub kind: InstrumentKind,
    pub interval: Interval,
    pub limit: Option<u32>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub anchor: MoveKind,
    pub first_candle: Candle,
    pub second_candle: Option<Candle>,
}

/// Picks the two extreme candles that follow the latest abnormal move.
///
/// After a pump the line runs through highs, after a dump through lows. The
/// first point is the extreme candle from the anchor onwards (earliest wins a
/// tie); the second is the extreme among candles closing after the first.
pub fn compute_inclined_line(
    series: &CandleSeries,
    pumps_dumps: &PumpDumpResult,
) -> Result<InclinedLine, AnalyticsError> {
    let last_pump = pumps_dumps.pumps.last();
    let last_dump = pumps_dumps.dumps.last();

    let (anchor, anchor_candle) = match (last_pump, last_dump) {
        (Some(pump), Some(dump)) if pump.close_time > dump.close_time => (MoveKind::Pump, pump),
        (Some(_), Some(dump)) => (MoveKind::Dump, dump),
        (Some(pump), None) => (MoveKind::Pump, pump),
        (None, Some(dump)) => (MoveKind::Dump, dump),
        (None, None) => {
            return Err(AnalyticsError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
    };

    let after_anchor: Vec<&Candle> = series
        .candles
        .iter()
        .filter(|c| c.close_time >= anchor_candle.close_time)
        .collect();

    let first_candle = extreme(anchor, after_anchor.iter().copied()).ok_or_else(|| {
        AnalyticsError::Validation {
            reason: format!(
                "anchor candle closing at {} is not part of the {} series",
                anchor_candle.close_time, series.symbol
            ),
        }
    })?;

    let second_candle = extreme(
        anchor,
        after_anchor
            .iter()
            .copied()
            .filter(|c| c.close_time > first_candle.close_time),
    );

    Ok(InclinedLine {
        symbol: series.symbol.clone(),
        kind: series.kind,
        interval: series.interval,
        limit: series.limit,
        start_time: series.start_time,
        end_time: series.end_time,
        anchor,
        first_candle: first_candle.clone(),
        second_candle: second_candle.cloned(),
    })
}

fn extreme<'a>(anchor: MoveKind, candles: impl Iterator<Item = &'a Candle>) -> Option<&'a Candle> {
    candles.fold(None::<&'a Candle>, |best, candle| match best {
        None => Some(candle),
        Some(current) => {
            let better = match anchor {
                MoveKind::Pump => candle.high > current.high,
                MoveKind::Dump => candle.low < current.low,
            };
            Some(if better { candle } else { current })
        }
    })
}
