//! Additive trend + seasonality model
//!
//! `y(t) = g(t) + s_yearly(t) + s_weekly(t) + ε`, where `g` is a
//! piecewise-linear trend and the seasonal terms are Fourier series.
//! Closes are divided by their maximum absolute value and time is scaled to
//! `[0, 1]` over the history. Coefficients are the MAP estimate under
//! Laplace-like priors, approximated by a ridge fit with per-column penalties.

use super::seasonality::{
    day_number, Seasonality, SeasonalityMode, WEEKLY_MIN_SPAN_DAYS, YEARLY_MIN_SPAN_DAYS,
};
use super::trend::{changepoint_positions, push_hinge_features, PiecewiseLinearTrend};
use super::uncertainty::{simulate_bounds, TrendUncertainty, UncertaintySettings};
use super::{FittedForecastModel, ForecastModel, ForecastRow, ForecastWarning, ModelSummary};
use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::{debug, warn};
use trade_math::regression::{linear_fit, ridge_solve};

/// Penalty floor keeping the normal matrix well conditioned
const MIN_PENALTY: f64 = 1e-4;
/// Near-flat prior on intercept and base slope
const BASE_PENALTY: f64 = 1e-9;
/// Added to the mean rate change so the simulated Laplace scale stays positive
const DELTA_SCALE_EPSILON: f64 = 1e-8;

/// Model hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditiveModelConfig {
    /// Number of potential trend changepoints
    pub n_changepoints: usize,
    /// Share of the history (from the start) eligible for changepoints
    pub changepoint_range: f64,
    /// Prior scale of trend rate changes; larger means a more flexible trend
    pub changepoint_prior_scale: f64,
    /// Prior scale of the seasonal coefficients
    pub seasonality_prior_scale: f64,
    pub yearly_seasonality: SeasonalityMode,
    pub weekly_seasonality: SeasonalityMode,
    pub yearly_order: usize,
    pub weekly_order: usize,
    /// Coverage of the prediction interval
    pub interval_width: f64,
    /// Monte-Carlo draws per row
    pub uncertainty_samples: usize,
    pub seed: Option<u64>,
}

impl Default for AdditiveModelConfig {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            yearly_seasonality: SeasonalityMode::Auto,
            weekly_seasonality: SeasonalityMode::Auto,
            yearly_order: 10,
            weekly_order: 3,
            interval_width: 0.8,
            uncertainty_samples: 1000,
            seed: None,
        }
    }
}

impl AdditiveModelConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ForecastError::InvalidInput(format!(
                "changepoint range must be in (0, 1], got {}",
                self.changepoint_range
            )));
        }
        if !(self.changepoint_prior_scale > 0.0 && self.changepoint_prior_scale.is_finite()) {
            return Err(ForecastError::InvalidInput(format!(
                "changepoint prior scale must be positive, got {}",
                self.changepoint_prior_scale
            )));
        }
        if !(self.seasonality_prior_scale > 0.0 && self.seasonality_prior_scale.is_finite()) {
            return Err(ForecastError::InvalidInput(format!(
                "seasonality prior scale must be positive, got {}",
                self.seasonality_prior_scale
            )));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::InvalidInput(format!(
                "interval width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        Ok(())
    }

    fn uncertainty(&self) -> UncertaintySettings {
        UncertaintySettings {
            samples: self.uncertainty_samples,
            interval_width: self.interval_width,
            seed: self.seed,
        }
    }
}

/// Additive trend/seasonality forecaster
#[derive(Debug, Clone)]
pub struct AdditiveModel {
    name: String,
    config: AdditiveModelConfig,
}

impl Default for AdditiveModel {
    fn default() -> Self {
        Self {
            name: "Additive(trend+seasonality)".to_string(),
            config: AdditiveModelConfig::default(),
        }
    }
}

impl AdditiveModel {
    pub fn new(config: AdditiveModelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &AdditiveModelConfig {
        &self.config
    }
}

/// One seasonal component with its fitted coefficients
#[derive(Debug, Clone)]
struct SeasonalTerm {
    seasonality: Seasonality,
    coefficients: Vec<f64>,
}

/// Additive model fitted to one series
#[derive(Debug, Clone)]
pub struct FittedAdditiveModel {
    name: String,
    origin: NaiveDate,
    /// Days mapped onto one unit of scaled time
    t_scale: f64,
    y_scale: f64,
    trend: PiecewiseLinearTrend,
    seasonal: Vec<SeasonalTerm>,
    /// Residual standard deviation in scaled units
    sigma: f64,
    observations: usize,
    span_days: i64,
    uncertainty: UncertaintySettings,
    warnings: Vec<ForecastWarning>,
}

impl FittedAdditiveModel {
    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.origin).num_days() as f64 / self.t_scale
    }

    fn scaled_yhat(&self, date: NaiveDate) -> f64 {
        let t = self.scaled_time(date);
        let day = day_number(date);
        self.trend.value(t)
            + self
                .seasonal
                .iter()
                .map(|term| term.seasonality.evaluate(day, &term.coefficients))
                .sum::<f64>()
    }

    pub fn trend(&self) -> &PiecewiseLinearTrend {
        &self.trend
    }

    fn trend_uncertainty(&self) -> TrendUncertainty {
        let dt_per_day = 1.0 / self.t_scale;
        let n_changepoints = self.trend.changepoints.len();
        if n_changepoints == 0 {
            return TrendUncertainty::none(dt_per_day);
        }
        TrendUncertainty {
            change_probability: n_changepoints as f64 / self.t_scale,
            delta_scale: self.trend.mean_abs_delta() + DELTA_SCALE_EPSILON,
            dt_per_day,
        }
    }
}

impl ForecastModel for AdditiveModel {
    type Fitted = FittedAdditiveModel;

    fn fit(&self, series: &PriceSeries) -> Result<Self::Fitted> {
        let cfg = &self.config;
        let origin = series.first_date();
        let span_days = series.span_days();
        let t_scale = span_days.max(1) as f64;

        let closes = series.closes();
        let y_scale = closes.iter().fold(0.0_f64, |acc, y| acc.max(y.abs()));
        if !(y_scale > 0.0 && y_scale.is_finite()) {
            return Err(ForecastError::InvalidInput(format!(
                "cannot scale closes for {}",
                series.symbol()
            )));
        }

        let ts: Vec<f64> = series
            .points()
            .iter()
            .map(|p| (p.date - origin).num_days() as f64 / t_scale)
            .collect();
        let ys: Vec<f64> = closes.iter().map(|y| y / y_scale).collect();

        let mut warnings = Vec::new();
        if span_days < YEARLY_MIN_SPAN_DAYS {
            warn!(
                symbol = series.symbol(),
                span_days,
                recommended_days = YEARLY_MIN_SPAN_DAYS,
                "history shorter than two years, forecast quality will suffer"
            );
            warnings.push(ForecastWarning::InsufficientHistory {
                observed_days: span_days,
                recommended_days: YEARLY_MIN_SPAN_DAYS,
            });
        }

        let mut seasonalities = Vec::new();
        if cfg.yearly_order > 0 && cfg.yearly_seasonality.resolve(span_days, YEARLY_MIN_SPAN_DAYS) {
            seasonalities.push(Seasonality::yearly(cfg.yearly_order));
        }
        if cfg.weekly_order > 0 && cfg.weekly_seasonality.resolve(span_days, WEEKLY_MIN_SPAN_DAYS) {
            seasonalities.push(Seasonality::weekly(cfg.weekly_order));
        }

        let changepoints = changepoint_positions(&ts, cfg.n_changepoints, cfg.changepoint_range);

        // Noise level from a straight-line prefit sets the prior strength
        let line = linear_fit(&ts, &ys)?;
        let noise_variance = ts
            .iter()
            .zip(&ys)
            .map(|(&t, &y)| (y - line.predict(t)).powi(2))
            .sum::<f64>()
            / ys.len() as f64;

        let changepoint_penalty =
            (noise_variance / cfg.changepoint_prior_scale.powi(2)).max(MIN_PENALTY);
        let seasonal_penalty =
            (noise_variance / cfg.seasonality_prior_scale.powi(2)).max(MIN_PENALTY);

        let seasonal_columns: usize = seasonalities.iter().map(Seasonality::columns).sum();
        let mut penalties = vec![BASE_PENALTY, BASE_PENALTY];
        penalties.extend(std::iter::repeat(changepoint_penalty).take(changepoints.len()));
        penalties.extend(std::iter::repeat(seasonal_penalty).take(seasonal_columns));

        let design: Vec<Vec<f64>> = series
            .points()
            .iter()
            .zip(&ts)
            .map(|(point, &t)| {
                let mut row = Vec::with_capacity(penalties.len());
                row.push(1.0);
                row.push(t);
                push_hinge_features(t, &changepoints, &mut row);
                let day = day_number(point.date);
                for seasonality in &seasonalities {
                    seasonality.push_features(day, &mut row);
                }
                row
            })
            .collect();

        let coefficients = ridge_solve(&design, &ys, &penalties)?;

        let n_cp = changepoints.len();
        let trend = PiecewiseLinearTrend {
            intercept: coefficients[0],
            slope: coefficients[1],
            deltas: coefficients[2..2 + n_cp].to_vec(),
            changepoints,
        };

        let mut offset = 2 + n_cp;
        let seasonal: Vec<SeasonalTerm> = seasonalities
            .into_iter()
            .map(|seasonality| {
                let end = offset + seasonality.columns();
                let term = SeasonalTerm {
                    seasonality,
                    coefficients: coefficients[offset..end].to_vec(),
                };
                offset = end;
                term
            })
            .collect();

        let residuals: Vec<f64> = design
            .iter()
            .zip(&ys)
            .map(|(row, y)| y - row.iter().zip(&coefficients).map(|(x, b)| x * b).sum::<f64>())
            .collect();
        let sigma = residuals.iter().quadratic_mean();

        debug!(
            symbol = series.symbol(),
            observations = series.len(),
            changepoints = n_cp,
            seasonal_components = seasonal.len(),
            residual_std = sigma * y_scale,
            "additive model fitted"
        );

        Ok(FittedAdditiveModel {
            name: self.name.clone(),
            origin,
            t_scale,
            y_scale,
            trend,
            seasonal,
            sigma: if sigma.is_finite() { sigma } else { 0.0 },
            observations: series.len(),
            span_days,
            uncertainty: cfg.uncertainty(),
            warnings,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedForecastModel for FittedAdditiveModel {
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastRow>> {
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ForecastError::InvalidInput(
                "prediction dates must be strictly ascending".to_string(),
            ));
        }

        let ts: Vec<f64> = dates.iter().map(|&d| self.scaled_time(d)).collect();
        let yhat: Vec<f64> = dates.iter().map(|&d| self.scaled_yhat(d)).collect();
        let bounds = simulate_bounds(
            &yhat,
            &ts,
            1.0,
            self.sigma,
            &self.trend_uncertainty(),
            &self.uncertainty,
        )?;

        Ok(dates
            .iter()
            .zip(yhat.iter().zip(bounds))
            .map(|(&date, (&y, (lower, upper)))| {
                ForecastRow::new(
                    date,
                    y * self.y_scale,
                    lower * self.y_scale,
                    upper * self.y_scale,
                )
            })
            .collect())
    }

    fn warnings(&self) -> &[ForecastWarning] {
        &self.warnings
    }

    fn summary(&self) -> ModelSummary {
        let has = |name: &str| self.seasonal.iter().any(|t| t.seasonality.name == name);
        ModelSummary {
            model: self.name.clone(),
            observations: self.observations,
            span_days: self.span_days,
            changepoints: self.trend.changepoints.len(),
            yearly_seasonality: has("yearly"),
            weekly_seasonality: has("weekly"),
            residual_std: self.sigma * self.y_scale,
            final_trend_per_day: self.trend.final_slope() * self.y_scale / self.t_scale,
        }
    }
}
