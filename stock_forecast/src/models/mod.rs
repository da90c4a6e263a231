//! Forecasting models for daily close series

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use crate::utils::{calendar_days, forecast_accuracy, ForecastAccuracy};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Instant;
use tracing::info;

pub mod additive;
pub mod seasonality;
pub mod trend;
pub mod uncertainty;

pub use additive::{AdditiveModel, AdditiveModelConfig, FittedAdditiveModel};
pub use seasonality::SeasonalityMode;

/// Longest horizon a single request may ask for
pub const MAX_HORIZON_DAYS: i64 = 3650;

/// Point forecast with its prediction interval for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

impl ForecastRow {
    /// Build a row; the bounds are widened to contain `yhat` if needed
    pub fn new(date: NaiveDate, yhat: f64, yhat_lower: f64, yhat_upper: f64) -> Self {
        Self {
            date,
            yhat,
            yhat_lower: yhat_lower.min(yhat),
            yhat_upper: yhat_upper.max(yhat),
        }
    }
}

/// Non-fatal conditions that degrade forecast quality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastWarning {
    /// History too short to estimate yearly seasonality reliably
    InsufficientHistory {
        observed_days: i64,
        recommended_days: i64,
    },
}

impl std::fmt::Display for ForecastWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastWarning::InsufficientHistory {
                observed_days,
                recommended_days,
            } => write!(
                f,
                "insufficient history: {} days observed, {} recommended; yearly seasonality skipped and intervals are less reliable",
                observed_days, recommended_days
            ),
        }
    }
}

/// What a fitted model ended up containing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model: String,
    pub observations: usize,
    pub span_days: i64,
    pub changepoints: usize,
    pub yearly_seasonality: bool,
    pub weekly_seasonality: bool,
    /// Residual standard deviation in price units
    pub residual_std: f64,
    /// Trend slope at the end of the history, in price units per day
    pub final_trend_per_day: f64,
}

/// Fitted and projected values over the history plus the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub symbol: String,
    pub history_start: NaiveDate,
    pub history_end: NaiveDate,
    pub horizon_days: i64,
    pub rows: Vec<ForecastRow>,
    pub warnings: Vec<ForecastWarning>,
    pub summary: ModelSummary,
    /// In-sample accuracy of `yhat` against the observed closes
    pub accuracy: ForecastAccuracy,
}

impl Forecast {
    /// Row for an exact date
    pub fn row_for(&self, date: NaiveDate) -> Option<&ForecastRow> {
        self.rows
            .binary_search_by_key(&date, |row| row.date)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Rows after the last observed date
    pub fn future_rows(&self) -> &[ForecastRow] {
        let first_future = self.rows.partition_point(|row| row.date <= self.history_end);
        &self.rows[first_future..]
    }

    /// Row at the far end of the horizon
    pub fn last_row(&self) -> Option<&ForecastRow> {
        self.rows.last()
    }
}

/// Trained forecast model
pub trait FittedForecastModel: Debug + Send {
    /// Predict rows for the given ascending dates (in-sample or future)
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastRow>>;

    /// Warnings raised while fitting
    fn warnings(&self) -> &[ForecastWarning];

    /// Description of the fitted components
    fn summary(&self) -> ModelSummary;
}

/// Forecast model that can be fitted to a price series
pub trait ForecastModel: Debug + Clone + Send + Sync {
    /// The type of fitted model produced
    type Fitted: FittedForecastModel;

    /// Fit the model to the whole series
    fn fit(&self, series: &PriceSeries) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Fits a model from scratch for every request and projects it forward
#[derive(Debug, Clone)]
pub struct ForecastEngine<M: ForecastModel = AdditiveModel> {
    model: M,
}

impl Default for ForecastEngine<AdditiveModel> {
    fn default() -> Self {
        Self::new(AdditiveModel::default())
    }
}

impl<M: ForecastModel> ForecastEngine<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Fit the whole history and predict one row per calendar day from the
    /// first observation through `horizon_days` past the last one.
    ///
    /// CPU bound; async callers should run it on a blocking thread.
    pub fn fit_and_predict(&self, series: &PriceSeries, horizon_days: i64) -> Result<Forecast> {
        if horizon_days < 0 {
            return Err(ForecastError::InvalidInput(format!(
                "horizon must not be negative, got {}",
                horizon_days
            )));
        }
        if horizon_days > MAX_HORIZON_DAYS {
            return Err(ForecastError::InvalidInput(format!(
                "horizon of {} days exceeds the maximum of {}",
                horizon_days, MAX_HORIZON_DAYS
            )));
        }

        let started = Instant::now();
        let fitted = self.model.fit(series)?;

        let last_day = series
            .last_date()
            .checked_add_signed(Duration::days(horizon_days))
            .ok_or_else(|| {
                ForecastError::InvalidInput(format!("horizon of {} days overflows", horizon_days))
            })?;
        let dates = calendar_days(series.first_date(), last_day);
        let rows = fitted.predict(&dates)?;

        let in_sample: Vec<f64> = series
            .points()
            .iter()
            .filter_map(|p| {
                rows.binary_search_by_key(&p.date, |row| row.date)
                    .ok()
                    .map(|i| rows[i].yhat)
            })
            .collect();
        let accuracy = forecast_accuracy(&in_sample, &series.closes())?;

        info!(
            symbol = series.symbol(),
            model = self.model.name(),
            observations = series.len(),
            horizon_days,
            rows = rows.len(),
            mape = accuracy.mape,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "forecast generated"
        );

        Ok(Forecast {
            symbol: series.symbol().to_string(),
            history_start: series.first_date(),
            history_end: series.last_date(),
            horizon_days,
            rows,
            warnings: fitted.warnings().to_vec(),
            summary: fitted.summary(),
            accuracy,
        })
    }
}
