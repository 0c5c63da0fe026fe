use thiserror::Error;

/// Errors raised by the pure analytics transforms
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Division by zero: {context}")]
    DivideByZero { context: String },

    #[error("Candle series for {symbol} is empty")]
    EmptySeries { symbol: String },

    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Series length mismatch for {symbol}: expected {expected} candles, got {actual}")]
    LengthMismatch {
        symbol: String,
        expected: usize,
        actual: usize,
    },

    #[error("Validation failed: {reason}")]
    Validation { reason: String },
}

impl AnalyticsError {
    pub fn divide_by_zero(context: impl Into<String>) -> Self {
        AnalyticsError::DivideByZero {
            context: context.into(),
        }
    }
}

/// Errors related to market data queries and upstream payloads
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("Invalid market data for {symbol}: {reason}")]
    InvalidData { symbol: String, reason: String },

    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },
}

/// Errors produced by the correlation fetch orchestration
#[derive(Debug, Error)]
pub enum CorrelationError {
    #[error("Upstream fetch failed for {symbol}: {source:#}")]
    Upstream {
        symbol: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Fetch for {symbol} timed out after {timeout_ms}ms")]
    Timeout { symbol: String, timeout_ms: u64 },

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}
