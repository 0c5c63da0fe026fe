pub mod correlation_engine;
pub mod market_analysis;

pub use correlation_engine::{CorrelationEngine, CorrelationFailure, CorrelationReport};
pub use market_analysis::MarketAnalysisService;
