//! Utility functions for the stock_forecast crate

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date parsing for upstream files and command line arguments
pub mod date_parser {
    use super::*;
    use chrono::NaiveDateTime;

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    /// Parse a calendar date, accepting ISO dates and timestamps with a time part
    pub fn parse_date(value: &str) -> Result<NaiveDate> {
        let value = value.trim();

        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(value, format) {
                return Ok(date);
            }
        }
        for format in DATETIME_FORMATS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
                return Ok(datetime.date());
            }
        }
        // Offsets such as 2024-01-02T00:00:00-05:00 keep their local calendar date
        if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(value) {
            return Ok(datetime.date_naive());
        }

        Err(ForecastError::InvalidInput(format!(
            "Unrecognised date: {}",
            value
        )))
    }
}

/// Every calendar day from `start` to `end`, both inclusive
pub fn calendar_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}

/// Error metrics of predicted closes against realised ones
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::InvalidInput(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;
    let errors: Vec<f64> = actual.iter().zip(forecast).map(|(a, f)| a - f).collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e * e).sum::<f64>() / n;
    let rmse = mse.sqrt();

    // Zero closes have no percentage error; average over the rest
    let (pct_sum, pct_count) = actual
        .iter()
        .zip(&errors)
        .filter(|(a, _)| **a != 0.0)
        .fold((0.0, 0usize), |(sum, count), (a, e)| {
            (sum + 100.0 * e.abs() / a.abs(), count + 1)
        });
    let mape = if pct_count == 0 {
        0.0
    } else {
        pct_sum / pct_count as f64
    };

    // Both sides zero counts as a perfect hit
    let smape = actual
        .iter()
        .zip(forecast)
        .map(|(a, f)| match a.abs() + f.abs() {
            denom if denom == 0.0 => 0.0,
            denom => 200.0 * (a - f).abs() / denom,
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse,
        mape,
        smape,
    })
}

/// Forecast accuracy metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}
