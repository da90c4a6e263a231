//! Fourier-series seasonal components

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

pub const YEARLY_PERIOD_DAYS: f64 = 365.25;
pub const WEEKLY_PERIOD_DAYS: f64 = 7.0;

/// History needed before yearly seasonality is fitted automatically (two periods)
pub const YEARLY_MIN_SPAN_DAYS: i64 = 730;
/// History needed before weekly seasonality is fitted automatically
pub const WEEKLY_MIN_SPAN_DAYS: i64 = 14;

/// Whether a seasonal component is fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityMode {
    /// Fit when the history covers enough periods
    #[default]
    Auto,
    On,
    Off,
}

impl SeasonalityMode {
    pub fn resolve(self, span_days: i64, min_span_days: i64) -> bool {
        match self {
            SeasonalityMode::Auto => span_days >= min_span_days,
            SeasonalityMode::On => true,
            SeasonalityMode::Off => false,
        }
    }
}

impl FromStr for SeasonalityMode {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(SeasonalityMode::Auto),
            "on" | "true" | "yes" => Ok(SeasonalityMode::On),
            "off" | "false" | "no" => Ok(SeasonalityMode::Off),
            other => Err(ForecastError::InvalidInput(format!(
                "unknown seasonality mode '{}'",
                other
            ))),
        }
    }
}

/// A periodic component expressed as `order` sine/cosine pairs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seasonality {
    pub name: &'static str,
    pub period_days: f64,
    pub order: usize,
}

impl Seasonality {
    pub fn yearly(order: usize) -> Self {
        Self {
            name: "yearly",
            period_days: YEARLY_PERIOD_DAYS,
            order,
        }
    }

    pub fn weekly(order: usize) -> Self {
        Self {
            name: "weekly",
            period_days: WEEKLY_PERIOD_DAYS,
            order,
        }
    }

    /// Number of design columns
    pub fn columns(&self) -> usize {
        2 * self.order
    }

    /// Append `sin(2πk·day/P), cos(2πk·day/P)` for k = 1..=order
    pub fn push_features(&self, day: f64, out: &mut Vec<f64>) {
        for k in 1..=self.order {
            let angle = 2.0 * PI * k as f64 * day / self.period_days;
            out.push(angle.sin());
            out.push(angle.cos());
        }
    }

    /// Value of the component for the given coefficients
    pub fn evaluate(&self, day: f64, coefficients: &[f64]) -> f64 {
        let mut features = Vec::with_capacity(self.columns());
        self.push_features(day, &mut features);
        features.iter().zip(coefficients).map(|(x, b)| x * b).sum()
    }
}

/// Absolute day count used as the seasonal phase, so fit and predict agree
pub fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}
