use super::percent_change::percent_change;
use crate::domain::errors::AnalyticsError;
use crate::domain::market::CandleSeries;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Up,
    Down,
    Unchanged,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Up => write!(f, "UP"),
            TrendDirection::Down => write!(f, "DOWN"),
            TrendDirection::Unchanged => write!(f, "UNCHANGED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResult {
    pub direction: TrendDirection,
    pub percent_change: f64,
}

/// Direction and size of the move from the first candle's open to the last
/// candle's close. A single candle compares its own open and close.
pub fn compute_trend(series: &CandleSeries) -> Result<TrendResult, AnalyticsError> {
    let (Some(first), Some(last)) = (series.candles.first(), series.candles.last()) else {
        return Err(AnalyticsError::EmptySeries {
            symbol: series.symbol.clone(),
        });
    };

    let percent_change = percent_change(first.open, last.close, false)?;
    let delta = last.close - first.open;

    let direction = if delta > 0.0 {
        TrendDirection::Up
    } else if delta < 0.0 {
        TrendDirection::Down
    } else {
        TrendDirection::Unchanged
    };

    Ok(TrendResult {
        direction,
        percent_change,
    })
}
