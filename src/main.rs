//! Marketscope CLI
//!
//! Runs one market analysis against Binance public data and prints the
//! result as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use marketscope::application::{CorrelationEngine, MarketAnalysisService};
use marketscope::config::Config;
use marketscope::domain::market::{CandleQuery, InstrumentKind, Interval};
use marketscope::domain::ports::MarketDataProvider;
use marketscope::infrastructure::binance::BinanceMarketDataService;
use serde::Serialize;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Crypto market analytics over Binance public data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SeriesArgs {
    /// Symbol, e.g. BTCUSDT
    #[arg(short, long)]
    symbol: String,

    /// Market (spot, futures)
    #[arg(short, long, default_value = "spot")]
    kind: InstrumentKind,

    /// Candle interval (1m, 5m, 1h, 1d, 1M, ...)
    #[arg(short, long, default_value = "1h")]
    interval: Interval,

    /// Number of candles
    #[arg(short, long)]
    limit: Option<u32>,

    /// Start date (YYYY-MM-DD), requires --end
    #[arg(long, requires = "end")]
    start: Option<String>,

    /// End date (YYYY-MM-DD), requires --start
    #[arg(long, requires = "start")]
    end: Option<String>,
}

impl SeriesArgs {
    fn to_query(&self) -> Result<CandleQuery> {
        let mut query = CandleQuery::new(self.symbol.to_uppercase(), self.kind, self.interval);
        if let Some(limit) = self.limit {
            query = query.with_limit(limit);
        }
        if let (Some(start), Some(end)) = (&self.start, &self.end) {
            query = query.with_range(parse_date(start)?, parse_date(end)?);
        }
        Ok(query)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Order book levels with unusually large resting quantity
    Density {
        #[arg(short, long)]
        symbol: String,

        #[arg(short, long, default_value = "spot")]
        kind: InstrumentKind,

        /// Multiple of the average level quantity (overrides DENSITY_COEFFICIENT)
        #[arg(short, long)]
        coefficient: Option<f64>,

        /// Order book depth (overrides ORDER_BOOK_DEPTH)
        #[arg(short, long)]
        depth: Option<u32>,
    },
    /// Direction and size of the move over a candle series
    Trend {
        #[command(flatten)]
        series: SeriesArgs,
    },
    /// Candles whose move is abnormally large
    Pumps {
        #[command(flatten)]
        series: SeriesArgs,

        /// Multiple of the average move (overrides PUMP_DUMP_COEFFICIENT)
        #[arg(short, long)]
        coefficient: Option<f64>,
    },
    /// Line through the extremes following the latest pump or dump
    InclinedLine {
        #[command(flatten)]
        series: SeriesArgs,

        #[arg(short, long)]
        coefficient: Option<f64>,
    },
    /// Correlate a reference symbol with a list of candidates
    Correlation {
        #[command(flatten)]
        series: SeriesArgs,

        /// Comma-separated candidate symbols
        #[arg(long)]
        candidates: String,

        /// Report failing candidates instead of aborting
        #[arg(long)]
        lenient: bool,
    },
    /// Correlate a reference symbol with every symbol trading on its market
    MarketCorrelation {
        #[command(flatten)]
        series: SeriesArgs,
    },
    /// List trading symbols and their price precision
    Tickers {
        #[arg(short, long, default_value = "spot")]
        kind: InstrumentKind,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;

    let provider: Arc<dyn MarketDataProvider> =
        Arc::new(BinanceMarketDataService::from_config(&config.binance));

    match cli.command {
        Commands::Density {
            symbol,
            kind,
            coefficient,
            depth,
        } => {
            if let Some(coefficient) = coefficient {
                config.analytics.density_coefficient = coefficient;
            }
            if let Some(depth) = depth {
                config.analytics.order_book_depth = depth;
            }
            let service = MarketAnalysisService::new(provider, config.analytics);
            print_json(&service.density(&symbol.to_uppercase(), kind).await?)?;
        }
        Commands::Trend { series } => {
            let service = MarketAnalysisService::new(provider, config.analytics);
            print_json(&service.trend(&series.to_query()?).await?)?;
        }
        Commands::Pumps {
            series,
            coefficient,
        } => {
            if let Some(coefficient) = coefficient {
                config.analytics.pump_dump_coefficient = coefficient;
            }
            let service = MarketAnalysisService::new(provider, config.analytics);
            print_json(&service.pumps_dumps(&series.to_query()?).await?)?;
        }
        Commands::InclinedLine {
            series,
            coefficient,
        } => {
            if let Some(coefficient) = coefficient {
                config.analytics.pump_dump_coefficient = coefficient;
            }
            let service = MarketAnalysisService::new(provider, config.analytics);
            print_json(&service.inclined_line(&series.to_query()?).await?)?;
        }
        Commands::Correlation {
            series,
            candidates,
            lenient,
        } => {
            let reference = series.to_query()?;
            let candidate_queries: Vec<CandleQuery> = candidates
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .map(|s| reference.for_symbol(s))
                .collect();

            info!(
                "Correlating {} with {} candidates",
                reference.symbol,
                candidate_queries.len()
            );

            let engine = CorrelationEngine::from_config(provider, &config.analytics);
            if lenient {
                print_json(
                    &engine
                        .fetch_and_correlate_lenient(&reference, &candidate_queries)
                        .await?,
                )?;
            } else {
                print_json(
                    &engine
                        .fetch_and_correlate(&reference, &candidate_queries)
                        .await?,
                )?;
            }
        }
        Commands::MarketCorrelation { series } => {
            let engine = CorrelationEngine::from_config(provider, &config.analytics);
            print_json(&engine.correlate_with_market(&series.to_query()?).await?)?;
        }
        Commands::Tickers { kind } => {
            let service = MarketAnalysisService::new(provider, config.analytics);
            let tickers = service.tickers(kind).await?;
            let rows: Vec<TickerRow> = tickers
                .iter()
                .map(|t| TickerRow {
                    symbol: &t.symbol,
                    tick_size: t.tick_size.normalize().to_string(),
                    price_precision: t.price_precision(),
                })
                .collect();
            print_json(&rows)?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TickerRow<'a> {
    symbol: &'a str,
    tick_size: String,
    price_precision: u32,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .context(format!("Invalid date format: {}", raw))?;
    Utc.from_local_datetime(&date.and_hms_opt(0, 0, 0).context("Invalid time")?)
        .single()
        .context("Failed to create datetime")
}
