//! Mapping a requested target date onto a forecast row

use crate::error::{ForecastError, Result};
use crate::models::{Forecast, ForecastRow};
use chrono::NaiveDate;

/// Picks the forecast row that answers a date query
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastQueryResolver;

impl ForecastQueryResolver {
    pub fn new() -> Self {
        Self
    }

    /// Row for `target` if the forecast contains it; otherwise the first row
    /// dated after `today`.
    ///
    /// The fallback is anchored on the evaluation date, not on the target, so
    /// a far-off target that misses the horizon resolves to tomorrow's row.
    pub fn resolve(
        &self,
        forecast: &Forecast,
        target: NaiveDate,
        today: NaiveDate,
    ) -> Result<ForecastRow> {
        if let Some(row) = forecast.row_for(target) {
            return Ok(*row);
        }

        let first_after = forecast.rows.partition_point(|row| row.date <= today);
        forecast.rows.get(first_after).copied().ok_or_else(|| {
            ForecastError::NoForecastAvailable(format!(
                "{}: no row for {} and none after {}",
                forecast.symbol, target, today
            ))
        })
    }

    /// Row for `target` only
    pub fn resolve_exact(&self, forecast: &Forecast, target: NaiveDate) -> Result<ForecastRow> {
        forecast.row_for(target).copied().ok_or_else(|| {
            ForecastError::NoForecastAvailable(format!(
                "{}: forecast has no row for {}",
                forecast.symbol, target
            ))
        })
    }

    /// The first `n` rows dated after `today`
    pub fn future_slice(&self, forecast: &Forecast, today: NaiveDate, n: usize) -> Vec<ForecastRow> {
        let first_after = forecast.rows.partition_point(|row| row.date <= today);
        forecast.rows[first_after..].iter().take(n).copied().collect()
    }
}
