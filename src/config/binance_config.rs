//! Binance REST configuration parsing from environment variables.
//!
//! Only public market-data endpoints are used, so no credentials are read.

use super::parse_var;
use anyhow::Result;

/// Binance REST endpoints and transport settings
#[derive(Debug, Clone, PartialEq)]
pub struct BinanceConfig {
    pub spot_base_url: String,
    pub futures_base_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Transport-level retries of transient HTTP failures (0 disables)
    pub max_retries: u32,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            spot_base_url: "https://api.binance.com".to_string(),
            futures_base_url: "https://fapi.binance.com".to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 3,
        }
    }
}

impl BinanceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            spot_base_url: lookup("BINANCE_SPOT_BASE_URL").unwrap_or(defaults.spot_base_url),
            futures_base_url: lookup("BINANCE_FUTURES_BASE_URL")
                .unwrap_or(defaults.futures_base_url),
            request_timeout_secs: parse_var(&lookup, "BINANCE_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            connect_timeout_secs: parse_var(&lookup, "BINANCE_CONNECT_TIMEOUT_SECS")?
                .unwrap_or(defaults.connect_timeout_secs),
            max_retries: parse_var(&lookup, "BINANCE_MAX_RETRIES")?
                .unwrap_or(defaults.max_retries),
        })
    }
}
