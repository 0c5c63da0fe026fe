//! Analytics configuration parsing from environment variables.
//!
//! Coefficients and fetch limits used when the caller does not pass its own.

use super::parse_var;
use anyhow::Result;
use std::time::Duration;

/// Default number of candidate fetches kept in flight by the correlation engine
pub const DEFAULT_CORRELATION_BATCH_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    pub correlation_batch_size: usize,
    /// Per-fetch timeout for correlation candidates; `None` waits indefinitely
    pub correlation_fetch_timeout: Option<Duration>,
    pub density_coefficient: f64,
    pub pump_dump_coefficient: f64,
    pub order_book_depth: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            correlation_batch_size: DEFAULT_CORRELATION_BATCH_SIZE,
            correlation_fetch_timeout: None,
            density_coefficient: 3.0,
            pump_dump_coefficient: 3.0,
            order_book_depth: 100,
        }
    }
}

impl AnalyticsConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let correlation_batch_size = parse_var(&lookup, "CORRELATION_BATCH_SIZE")?
            .unwrap_or(defaults.correlation_batch_size);
        if correlation_batch_size == 0 {
            anyhow::bail!("CORRELATION_BATCH_SIZE must be at least 1");
        }

        let correlation_fetch_timeout =
            parse_var::<u64>(&lookup, "CORRELATION_FETCH_TIMEOUT_SECS")?
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs);

        Ok(Self {
            correlation_batch_size,
            correlation_fetch_timeout,
            density_coefficient: parse_var(&lookup, "DENSITY_COEFFICIENT")?
                .unwrap_or(defaults.density_coefficient),
            pump_dump_coefficient: parse_var(&lookup, "PUMP_DUMP_COEFFICIENT")?
                .unwrap_or(defaults.pump_dump_coefficient),
            order_book_depth: parse_var(&lookup, "ORDER_BOOK_DEPTH")?
                .unwrap_or(defaults.order_book_depth),
        })
    }
}
