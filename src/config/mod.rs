//! Configuration module for marketscope.
//!
//! Structured configuration loaded from environment variables (and `.env`
//! through dotenvy in the binary), split into exchange transport and
//! analytics settings.

mod analytics_config;
mod binance_config;

pub use analytics_config::{AnalyticsConfig, DEFAULT_CORRELATION_BATCH_SIZE};
pub use binance_config::BinanceConfig;

use anyhow::{Context, Result};
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub binance: BinanceConfig,
    pub analytics: AnalyticsConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            binance: BinanceConfig::from_env()?,
            analytics: AnalyticsConfig::from_env()?,
        })
    }
}

/// Reads `key` through `lookup` and parses it, naming the variable on failure
pub(crate) fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| raw.trim().parse::<T>())
        .transpose()
        .with_context(|| format!("Failed to parse {}", key))
}
