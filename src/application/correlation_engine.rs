//! Correlation Engine
//!
//! Fetches a reference series and many candidate series with a bounded
//! number of requests in flight, then correlates every candidate's closes
//! with the reference.

use crate::config::AnalyticsConfig;
use crate::domain::analytics::correlation::correlate_pair;
use crate::domain::analytics::{CorrelationPair, CorrelationResult, compute_correlation};
use crate::domain::errors::{AnalyticsError, CorrelationError};
use crate::domain::market::{CandleQuery, CandleSeries};
use crate::domain::ports::MarketDataProvider;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A candidate left out of a lenient correlation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationFailure {
    pub symbol: String,
    pub reason: String,
}

/// Coefficients for the candidates that succeeded plus the ones that did not.
///
/// Both lists keep the candidate order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub result: CorrelationResult,
    pub failures: Vec<CorrelationFailure>,
}

pub struct CorrelationEngine {
    provider: Arc<dyn MarketDataProvider>,
    batch_size: usize,
    fetch_timeout: Option<Duration>,
}

impl CorrelationEngine {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        batch_size: usize,
        fetch_timeout: Option<Duration>,
    ) -> Self {
        Self {
            provider,
            batch_size: batch_size.max(1),
            fetch_timeout,
        }
    }

    pub fn from_config(provider: Arc<dyn MarketDataProvider>, config: &AnalyticsConfig) -> Self {
        Self::new(
            provider,
            config.correlation_batch_size,
            config.correlation_fetch_timeout,
        )
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Correlates already fetched series
    pub fn compute_correlation(
        &self,
        reference: &CandleSeries,
        candidates: &[CandleSeries],
    ) -> Result<CorrelationResult, AnalyticsError> {
        compute_correlation(reference, candidates)
    }

    /// Fetches the reference, then every candidate, and correlates them.
    ///
    /// The first failing fetch or invalid candidate fails the whole call and
    /// cancels the fetches still in flight.
    pub async fn fetch_and_correlate(
        &self,
        reference_query: &CandleQuery,
        candidate_queries: &[CandleQuery],
    ) -> Result<CorrelationResult, CorrelationError> {
        let reference = self.fetch_series(reference_query).await?;

        info!(
            "CorrelationEngine: Fetching {} candidates for {} ({} in flight max)",
            candidate_queries.len(),
            reference.symbol,
            self.batch_size
        );

        let candidates: Vec<CandleSeries> = stream::iter(candidate_queries)
            .map(|query| self.fetch_series(query))
            .buffered(self.batch_size)
            .try_collect()
            .await?;

        Ok(compute_correlation(&reference, &candidates)?)
    }

    /// Like [`fetch_and_correlate`](Self::fetch_and_correlate), but a failing
    /// candidate is reported instead of failing the call. Only a reference
    /// failure is fatal.
    pub async fn fetch_and_correlate_lenient(
        &self,
        reference_query: &CandleQuery,
        candidate_queries: &[CandleQuery],
    ) -> Result<CorrelationReport, CorrelationError> {
        let reference = self.fetch_series(reference_query).await?;
        let reference_closes = reference.closes();

        let reference = &reference;
        let reference_closes = &reference_closes;

        let outcomes: Vec<(String, Result<CorrelationPair, CorrelationError>)> =
            stream::iter(candidate_queries)
                .map(|query| async move {
                    let outcome = match self.fetch_series(query).await {
                        Ok(series) => correlate_pair(reference, reference_closes, &series)
                            .map_err(CorrelationError::from),
                        Err(e) => Err(e),
                    };
                    (query.symbol.clone(), outcome)
                })
                .buffered(self.batch_size)
                .collect()
                .await;

        let mut pairs = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(pair) => pairs.push(pair),
                Err(e) => {
                    warn!("CorrelationEngine: Skipping {}: {}", symbol, e);
                    failures.push(CorrelationFailure {
                        symbol,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "CorrelationEngine: Correlated {} of {} candidates with {}",
            pairs.len(),
            candidate_queries.len(),
            reference.symbol
        );

        Ok(CorrelationReport {
            result: CorrelationResult {
                reference_symbol: reference.symbol.clone(),
                pairs,
            },
            failures,
        })
    }

    /// Correlates the reference with every other symbol trading on its market
    pub async fn correlate_with_market(
        &self,
        reference_query: &CandleQuery,
    ) -> Result<CorrelationReport, CorrelationError> {
        let tickers = self
            .provider
            .fetch_tickers(reference_query.kind)
            .await
            .map_err(|source| CorrelationError::Upstream {
                symbol: format!("{} tickers", reference_query.kind),
                source,
            })?;

        let candidate_queries: Vec<CandleQuery> = tickers
            .iter()
            .filter(|t| t.is_trading() && t.symbol != reference_query.symbol)
            .map(|t| reference_query.for_symbol(t.symbol.as_str()))
            .collect();

        self.fetch_and_correlate_lenient(reference_query, &candidate_queries)
            .await
    }

    async fn fetch_series(&self, query: &CandleQuery) -> Result<CandleSeries, CorrelationError> {
        debug!("CorrelationEngine: Fetching {}", query.symbol);

        let fetch = self.provider.fetch_candles(query);
        let result = match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch).await.map_err(|_| {
                CorrelationError::Timeout {
                    symbol: query.symbol.clone(),
                    timeout_ms: limit.as_millis() as u64,
                }
            })?,
            None => fetch.await,
        };

        result.map_err(|source| CorrelationError::Upstream {
            symbol: query.symbol.clone(),
            source,
        })
    }
}
