//! Order-book density: levels whose quantity stands out against the side's mean.

use crate::domain::errors::AnalyticsError;
use crate::domain::market::{OrderBookSnapshot, PriceLevel};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensitySide {
    pub average_quantity: f64,
    pub levels: Vec<PriceLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityResult {
    pub asks: DensitySide,
    pub bids: DensitySide,
}

/// Selects, on each side of the book, every level with
/// `quantity >= average_quantity * coefficient`, in book order.
///
/// The coefficient is not validated: `<= 0` keeps every level and a value
/// above `max / average` keeps none. An empty side is an error.
pub fn compute_density(
    book: &OrderBookSnapshot,
    coefficient: f64,
) -> Result<DensityResult, AnalyticsError> {
    Ok(DensityResult {
        asks: side_density(&book.symbol, "asks", &book.asks, coefficient)?,
        bids: side_density(&book.symbol, "bids", &book.bids, coefficient)?,
    })
}

fn side_density(
    symbol: &str,
    side: &str,
    levels: &[PriceLevel],
    coefficient: f64,
) -> Result<DensitySide, AnalyticsError> {
    if levels.is_empty() {
        return Err(AnalyticsError::divide_by_zero(format!(
            "average quantity of empty {} side for {}",
            side, symbol
        )));
    }

    let average_quantity = levels.iter().map(|l| l.quantity).sum::<f64>() / levels.len() as f64;
    let threshold = average_quantity * coefficient;

    let levels = levels
        .iter()
        .filter(|l| l.quantity >= threshold)
        .copied()
        .collect();

    Ok(DensitySide {
        average_quantity,
        levels,
    })
}
