use super::instrument::InstrumentKind;
use serde::{Deserialize, Serialize};

/// One order-book entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub quantity: f64,
}

impl PriceLevel {
    pub fn new(price: f64, quantity: f64) -> Self {
        Self { price, quantity }
    }
}

/// Order book at a point in time, alongside the last traded price.
///
/// Asks come ascending and bids descending by price, as the exchange sends them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBookSnapshot {
    pub symbol: String,
    pub kind: InstrumentKind,
    pub current_price: f64,
    pub asks: Vec<PriceLevel>,
    pub bids: Vec<PriceLevel>,
}
