//! Daily price data handled by the forecasting core

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily closing price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading day
    pub date: NaiveDate,
    /// Closing price, always positive
    pub close: f64,
}

impl PricePoint {
    /// Create a new price point
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// A full daily bar, kept for the price chart path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

/// Ordered daily closes for one symbol over a requested date range
///
/// Dates are strictly increasing and every close is finite and positive.
/// The series cannot be modified once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    start: NaiveDate,
    end: NaiveDate,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series whose range is the span of its own points
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self> {
        let symbol = symbol.into();
        let (start, end) = match (points.first(), points.last()) {
            (Some(first), Some(last)) => (first.date, last.date),
            _ => {
                return Err(ForecastError::DataUnavailable(format!(
                    "no price data for {}",
                    symbol
                )))
            }
        };
        Self::with_range(symbol, start, end, points)
    }

    /// Build a series for an explicitly requested `[start, end]` range
    pub fn with_range(
        symbol: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        points: Vec<PricePoint>,
    ) -> Result<Self> {
        let symbol = symbol.into();

        if start > end {
            return Err(ForecastError::InvalidInput(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        if points.is_empty() {
            return Err(ForecastError::DataUnavailable(format!(
                "no price data for {} between {} and {}",
                symbol, start, end
            )));
        }

        for point in &points {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(ForecastError::InvalidInput(format!(
                    "close on {} must be positive, got {}",
                    point.date, point.close
                )));
            }
            if point.date < start || point.date > end {
                return Err(ForecastError::InvalidInput(format!(
                    "{} lies outside the range {}..={}",
                    point.date, start, end
                )));
            }
        }

        if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(ForecastError::InvalidInput(format!(
                "dates must be strictly increasing ({} followed by {})",
                pair[0].date, pair[1].date
            )));
        }

        Ok(Self {
            symbol,
            start,
            end,
            points,
        })
    }

    /// Ticker symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Requested range as `(start, end)`
    pub fn requested_range(&self) -> (NaiveDate, NaiveDate) {
        (self.start, self.end)
    }

    /// The price points in date order
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed series; present for slice-like ergonomics
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closing prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Observation dates in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// First observed date
    pub fn first_date(&self) -> NaiveDate {
        self.points[0].date
    }

    /// Last observed date
    pub fn last_date(&self) -> NaiveDate {
        self.points[self.points.len() - 1].date
    }

    /// Latest observed close
    pub fn last_close(&self) -> f64 {
        self.points[self.points.len() - 1].close
    }

    /// Calendar days between the first and last observation
    pub fn span_days(&self) -> i64 {
        (self.last_date() - self.first_date()).num_days()
    }
}
