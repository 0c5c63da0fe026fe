//! Pearson correlation of close prices, paired by position.

use crate::domain::errors::AnalyticsError;
use crate::domain::market::CandleSeries;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub symbol: String,
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    pub reference_symbol: String,
    pub pairs: Vec<CorrelationPair>,
}

/// Pearson correlation coefficient of two equally long samples.
///
/// Fails when the lengths differ, when fewer than two points are given, or
/// when either sample is flat (zero variance).
pub fn pearson(xs: &[f64], ys: &[f64]) -> Result<f64, AnalyticsError> {
    if xs.len() != ys.len() {
        return Err(AnalyticsError::Validation {
            reason: format!("samples differ in length ({} vs {})", xs.len(), ys.len()),
        });
    }
    if xs.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            required: 2,
            actual: xs.len(),
        });
    }

    // Means through statrs (f64 boundary for the statistics library)
    let mean_x = Data::new(xs.to_vec())
        .mean()
        .ok_or(AnalyticsError::InsufficientData { required: 2, actual: 0 })?;
    let mean_y = Data::new(ys.to_vec())
        .mean()
        .ok_or(AnalyticsError::InsufficientData { required: 2, actual: 0 })?;

    let mut numerator = 0.0;
    let mut denom_x = 0.0;
    let mut denom_y = 0.0;

    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        numerator += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }

    if denom_x == 0.0 || denom_y == 0.0 {
        return Err(AnalyticsError::divide_by_zero(
            "correlation of a series with zero variance",
        ));
    }

    // Rounding can push |r| a hair past 1
    Ok((numerator / (denom_x * denom_y).sqrt()).clamp(-1.0, 1.0))
}

/// Correlates the close prices of every candidate with the reference series.
///
/// Candles are matched index by index, not by timestamp, so every candidate
/// must share the reference's market, interval, limit, time range and candle
/// count. Pairs come back in candidate order.
pub fn compute_correlation(
    reference: &CandleSeries,
    candidates: &[CandleSeries],
) -> Result<CorrelationResult, AnalyticsError> {
    let reference_closes = reference.closes();

    let pairs = candidates
        .iter()
        .map(|candidate| correlate_pair(reference, &reference_closes, candidate))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorrelationResult {
        reference_symbol: reference.symbol.clone(),
        pairs,
    })
}

/// Checks `candidate` against the reference and computes its coefficient
pub(crate) fn correlate_pair(
    reference: &CandleSeries,
    reference_closes: &[f64],
    candidate: &CandleSeries,
) -> Result<CorrelationPair, AnalyticsError> {
    check_same_window(reference, candidate)?;
    if candidate.len() != reference_closes.len() {
        return Err(AnalyticsError::LengthMismatch {
            symbol: candidate.symbol.clone(),
            expected: reference_closes.len(),
            actual: candidate.len(),
        });
    }

    let coefficient = pearson(reference_closes, &candidate.closes())?;

    Ok(CorrelationPair {
        symbol: candidate.symbol.clone(),
        coefficient,
    })
}

/// Rejects a candidate requested for another market, interval, limit or
/// time range than the reference.
fn check_same_window(reference: &CandleSeries, candidate: &CandleSeries) -> Result<(), AnalyticsError> {
    let mismatch = if candidate.kind != reference.kind {
        Some(format!("market {} vs {}", candidate.kind, reference.kind))
    } else if candidate.interval != reference.interval {
        Some(format!("interval {} vs {}", candidate.interval, reference.interval))
    } else if candidate.limit != reference.limit {
        Some(format!("limit {:?} vs {:?}", candidate.limit, reference.limit))
    } else if candidate.start_time != reference.start_time || candidate.end_time != reference.end_time {
        Some(format!(
            "range {:?}..{:?} vs {:?}..{:?}",
            candidate.start_time, candidate.end_time, reference.start_time, reference.end_time
        ))
    } else {
        None
    };

    match mismatch {
        Some(detail) => Err(AnalyticsError::Validation {
            reason: format!(
                "{} does not match reference {}: {}",
                candidate.symbol, reference.symbol, detail
            ),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::{Candle, InstrumentKind, Interval};
    use chrono::{TimeZone, Utc};

    fn series(symbol: &str, interval: Interval, closes: &[f64]) -> CandleSeries {
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, close)| Candle {
                open_time: i as i64 * 3_600_000,
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                volume: 1.0,
                close_time: i as i64 * 3_600_000 + 3_599_999,
                quote_volume: *close,
                trades: 1,
                base_asset_volume: 0.0,
                quote_asset_volume: 0.0,
            })
            .collect();

        CandleSeries {
            symbol: symbol.to_string(),
            kind: InstrumentKind::Spot,
            interval,
            limit: None,
            start_time: None,
            end_time: None,
            candles,
        }
    }

    #[test]
    fn test_identical_and_inverted_series() {
        let xs = [10.0, 12.5, 11.0, 14.0, 13.2, 15.8];
        let inverted: Vec<f64> = xs.iter().map(|x| -x + 40.0).collect();

        assert!((pearson(&xs, &xs).unwrap() - 1.0).abs() < 1e-9);
        assert!((pearson(&xs, &inverted).unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_known_coefficient() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 4.0, 5.0, 4.0, 5.0];
        // cov = 6, var_x = 10, var_y = 6 -> 6 / sqrt(60)
        let expected = 6.0 / 60.0_f64.sqrt();
        assert!((pearson(&xs, &ys).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_inputs_are_errors() {
        assert!(matches!(
            pearson(&[1.0], &[2.0]),
            Err(AnalyticsError::InsufficientData { .. })
        ));
        assert!(matches!(
            pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]),
            Err(AnalyticsError::DivideByZero { .. })
        ));
        assert!(pearson(&[1.0, 2.0], &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_pairs_follow_candidate_order() {
        let reference = series("BTCUSDT", Interval::OneHour, &[1.0, 2.0, 3.0, 4.0]);
        let candidates = vec![
            series("XRPUSDT", Interval::OneHour, &[4.0, 3.0, 2.0, 1.0]),
            series("ETHUSDT", Interval::OneHour, &[2.0, 4.0, 6.0, 8.0]),
        ];

        let result = compute_correlation(&reference, &candidates).unwrap();
        assert_eq!(result.reference_symbol, "BTCUSDT");
        let symbols: Vec<&str> = result.pairs.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["XRPUSDT", "ETHUSDT"]);
        assert!((result.pairs[0].coefficient + 1.0).abs() < 1e-9);
        assert!((result.pairs[1].coefficient - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_mismatched_candidates_are_rejected() {
        let reference = series("BTCUSDT", Interval::OneHour, &[1.0, 2.0, 3.0]);

        let short = series("ETHUSDT", Interval::OneHour, &[1.0, 2.0]);
        assert!(matches!(
            compute_correlation(&reference, &[short]),
            Err(AnalyticsError::LengthMismatch { .. })
        ));

        let other_interval = series("ETHUSDT", Interval::OneDay, &[1.0, 2.0, 3.0]);
        assert!(matches!(
            compute_correlation(&reference, &[other_interval]),
            Err(AnalyticsError::Validation { .. })
        ));
    }

    #[test]
    fn test_candidates_from_another_window_are_rejected() {
        let at = |y: i32, m: u32, d: u32| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();

        let mut reference = series("BTCUSDT", Interval::OneHour, &[1.0, 2.0, 3.0]);
        reference.start_time = Some(at(2024, 1, 1));
        reference.end_time = Some(at(2024, 1, 2));

        let mut same_window = series("ETHUSDT", Interval::OneHour, &[2.0, 4.0, 6.0]);
        same_window.start_time = reference.start_time;
        same_window.end_time = reference.end_time;
        assert!(compute_correlation(&reference, &[same_window.clone()]).is_ok());

        let mut earlier = same_window.clone();
        earlier.start_time = Some(at(2023, 6, 1));
        earlier.end_time = Some(at(2023, 6, 2));
        assert!(matches!(
            compute_correlation(&reference, &[earlier]),
            Err(AnalyticsError::Validation { .. })
        ));

        let mut futures = same_window.clone();
        futures.kind = InstrumentKind::Futures;
        assert!(matches!(
            compute_correlation(&reference, &[futures]),
            Err(AnalyticsError::Validation { .. })
        ));

        let mut other_limit = same_window;
        other_limit.limit = Some(3);
        assert!(matches!(
            compute_correlation(&reference, &[other_limit]),
            Err(AnalyticsError::Validation { .. })
        ));
    }
}
