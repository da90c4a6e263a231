//! # Stock Forecast
//!
//! Forecasting core for daily stock closes: fetch history, compute technical
//! indicators, fit an additive trend + seasonality model and turn the
//! projection into a buy/hold/sell recommendation.
//!
//! ## Features
//!
//! - Daily history from Yahoo Finance or a directory of CSV files
//! - SMA(20), EMA(20) and RSI(14) snapshots
//! - Piecewise-linear trend with yearly and weekly Fourier seasonality,
//!   with Monte-Carlo prediction intervals (seedable)
//! - Threshold recommendations (±3%) and date resolution over a forecast
//!
//! ## Quick Start
//!
//! ```no_run
//! use stock_forecast::{InsightsConfig, StockInsights};
//!
//! # async fn run() -> stock_forecast::Result<()> {
//! let insights = StockInsights::from_config(InsightsConfig::from_env()?)?;
//!
//! let analysis = insights.get_analysis("AAPL", 7).await?;
//! println!("{}", analysis.message);
//!
//! let snapshot = insights.get_technical_snapshot("AAPL").await?;
//! println!("{} indicator rows", snapshot.indicators.len());
//! # Ok(())
//! # }
//! ```
//!
//! Nothing is cached: each call fetches, fits and answers from scratch.

pub mod config;
pub mod data;
pub mod error;
pub mod fetcher;
pub mod indicators;
pub mod logging;
pub mod models;
pub mod recommendation;
pub mod resolver;
pub mod service;
pub mod utils;

// Re-export commonly used types
pub use crate::config::{InsightsConfig, ProviderKind};
pub use crate::data::{Candle, PricePoint, PriceSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::fetcher::{MarketDataProvider, TimeSeriesFetcher};
pub use crate::indicators::{IndicatorEngine, IndicatorRow};
pub use crate::models::{
    AdditiveModel, AdditiveModelConfig, Forecast, ForecastEngine, ForecastModel, ForecastRow,
    ForecastWarning,
};
pub use crate::recommendation::{Action, Recommendation, RecommendationEngine};
pub use crate::resolver::ForecastQueryResolver;
pub use crate::service::{Analysis, PointPrediction, StockInsights, TechnicalSnapshot};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
