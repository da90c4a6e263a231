//! Request-level entry points
//!
//! Every call fetches fresh history, computes its result and returns it;
//! nothing is cached between requests. Model fitting runs on the blocking
//! thread pool so concurrent requests fit in parallel.

use crate::config::InsightsConfig;
use crate::data::{Candle, PriceSeries};
use crate::error::{ForecastError, Result};
use crate::fetcher::{MarketDataProvider, TimeSeriesFetcher};
use crate::indicators::{IndicatorEngine, IndicatorRow};
use crate::models::{AdditiveModel, Forecast, ForecastEngine, ForecastRow, ForecastWarning};
use crate::recommendation::{Recommendation, RecommendationEngine};
use crate::resolver::ForecastQueryResolver;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Latest complete indicator rows for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub symbol: String,
    pub indicators: Vec<IndicatorRow>,
}

/// Recommendation plus the forecast rows it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub symbol: String,
    /// Date the caller asked about
    pub target_date: NaiveDate,
    pub days_ahead: i64,
    pub recommendation: Recommendation,
    /// The first few forecast rows after the evaluation date
    pub forecast: Vec<ForecastRow>,
    pub message: String,
    /// True when the target was outside the forecast and the first future row was used
    pub used_fallback: bool,
    pub warnings: Vec<ForecastWarning>,
}

/// Forecast for one exact date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPrediction {
    pub symbol: String,
    pub date: NaiveDate,
    pub predicted_price: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone)]
pub struct StockInsights {
    config: InsightsConfig,
    fetcher: TimeSeriesFetcher,
    indicators: IndicatorEngine,
    engine: Arc<ForecastEngine<AdditiveModel>>,
    recommender: RecommendationEngine,
    resolver: ForecastQueryResolver,
}

impl StockInsights {
    pub fn new(config: InsightsConfig, provider: Arc<dyn MarketDataProvider>) -> Result<Self> {
        config.validate()?;
        let model = AdditiveModel::new(config.model.clone())?;

        Ok(Self {
            fetcher: TimeSeriesFetcher::new(provider),
            indicators: IndicatorEngine::new(),
            engine: Arc::new(ForecastEngine::new(model)),
            recommender: RecommendationEngine::new(),
            resolver: ForecastQueryResolver::new(),
            config,
        })
    }

    /// Build with the provider named in the configuration
    pub fn from_config(config: InsightsConfig) -> Result<Self> {
        let provider = config.build_provider()?;
        Self::new(config, provider)
    }

    pub fn config(&self) -> &InsightsConfig {
        &self.config
    }

    /// Today's date in UTC, the default evaluation date
    pub fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    pub async fn get_technical_snapshot(&self, symbol: &str) -> Result<TechnicalSnapshot> {
        self.get_technical_snapshot_as_of(symbol, Self::today()).await
    }

    pub async fn get_technical_snapshot_as_of(
        &self,
        symbol: &str,
        today: NaiveDate,
    ) -> Result<TechnicalSnapshot> {
        let series = self.history(symbol, today).await?;
        let indicators = self.indicators.snapshot(&series, self.config.snapshot_rows)?;

        Ok(TechnicalSnapshot {
            symbol: series.symbol().to_string(),
            indicators,
        })
    }

    pub async fn get_forecast(&self, symbol: &str, horizon_days: i64) -> Result<Forecast> {
        self.get_forecast_as_of(symbol, horizon_days, Self::today()).await
    }

    /// History through `today` plus `horizon_days` past the last observation
    pub async fn get_forecast_as_of(
        &self,
        symbol: &str,
        horizon_days: i64,
        today: NaiveDate,
    ) -> Result<Forecast> {
        let series = self.history(symbol, today).await?;
        self.fit(series, horizon_days).await
    }

    pub async fn get_analysis(&self, symbol: &str, days_ahead: i64) -> Result<Analysis> {
        self.get_analysis_as_of(symbol, days_ahead, Self::today()).await
    }

    /// Forecast `days_ahead` days past `today` and turn it into a recommendation
    pub async fn get_analysis_as_of(
        &self,
        symbol: &str,
        days_ahead: i64,
        today: NaiveDate,
    ) -> Result<Analysis> {
        if days_ahead <= 0 {
            return Err(ForecastError::InvalidInput(format!(
                "days ahead must be positive, got {}",
                days_ahead
            )));
        }
        let target_date = today
            .checked_add_signed(Duration::days(days_ahead))
            .ok_or_else(|| ForecastError::InvalidInput(format!("{} days ahead overflows", days_ahead)))?;

        let series = self.history(symbol, today).await?;
        let symbol = series.symbol().to_string();
        let current_price = series.last_close();

        // Measured from the last observation, which may lag `today`
        let horizon = self
            .config
            .analysis_horizon_days
            .max((target_date - series.last_date()).num_days());
        let forecast = self.fit(series, horizon).await?;

        let row = self.resolver.resolve(&forecast, target_date, today)?;
        let used_fallback = row.date != target_date;
        let recommendation = self
            .recommender
            .recommend(&symbol, row.date, current_price, row.yhat)?;

        let message = format!(
            "{} is expected to change by {:.2}% in {} days, going from ${:.2} to ${:.2}. Recommended action: {}.",
            symbol,
            recommendation.change_percent,
            days_ahead,
            current_price,
            row.yhat,
            recommendation.action.to_string().to_uppercase()
        );

        info!(
            symbol = %symbol,
            %target_date,
            resolved_date = %row.date,
            used_fallback,
            action = %recommendation.action,
            "analysis complete"
        );

        Ok(Analysis {
            symbol,
            target_date,
            days_ahead,
            forecast: self
                .resolver
                .future_slice(&forecast, today, self.config.analysis_slice_len),
            recommendation,
            message,
            used_fallback,
            warnings: forecast.warnings,
        })
    }

    pub async fn get_prediction(&self, symbol: &str, target: NaiveDate) -> Result<PointPrediction> {
        self.get_prediction_as_of(symbol, target, Self::today()).await
    }

    /// Forecast for exactly `target`; no fallback to other dates
    pub async fn get_prediction_as_of(
        &self,
        symbol: &str,
        target: NaiveDate,
        today: NaiveDate,
    ) -> Result<PointPrediction> {
        let series = self.history(symbol, today).await?;
        let horizon = (target - series.last_date()).num_days().max(0);
        let forecast = self.fit(series, horizon).await?;
        let row = self.resolver.resolve_exact(&forecast, target)?;

        Ok(PointPrediction {
            symbol: forecast.symbol,
            date: row.date,
            predicted_price: row.yhat,
            lower_bound: row.yhat_lower,
            upper_bound: row.yhat_upper,
        })
    }

    pub async fn get_recent_candles(&self, symbol: &str, days: i64) -> Result<Vec<Candle>> {
        self.get_recent_candles_as_of(symbol, days, Self::today()).await
    }

    /// Full daily bars over the last `days` calendar days
    pub async fn get_recent_candles_as_of(
        &self,
        symbol: &str,
        days: i64,
        today: NaiveDate,
    ) -> Result<Vec<Candle>> {
        if days <= 0 {
            return Err(ForecastError::InvalidInput(format!(
                "candle window must be positive, got {}",
                days
            )));
        }
        let start = today
            .checked_sub_signed(Duration::days(days))
            .ok_or_else(|| ForecastError::InvalidInput(format!("{} days back overflows", days)))?;

        self.fetcher.fetch_candles(symbol, start, today).await
    }

    async fn history(&self, symbol: &str, today: NaiveDate) -> Result<PriceSeries> {
        self.fetcher
            .fetch(symbol, self.config.history_start, today)
            .await
    }

    async fn fit(&self, series: PriceSeries, horizon_days: i64) -> Result<Forecast> {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || engine.fit_and_predict(&series, horizon_days)).await?
    }
}
