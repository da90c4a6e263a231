//! Technical indicators over a daily close series
//!
//! [`IndicatorEngine::compute`] produces one [`IndicatorRow`] per observation.
//! Early rows lack SMA/RSI values by construction; [`latest_complete`] drops
//! them before anything is shown.

use crate::data::PriceSeries;
use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use trade_math::moving_averages::{ExponentialMovingAverage, SimpleMovingAverage};
use trade_math::oscillators::RelativeStrengthIndex;

pub const SMA_PERIOD: usize = 20;
pub const EMA_PERIOD: usize = 20;
pub const RSI_PERIOD: usize = 14;
/// Complete rows kept for a technical snapshot
pub const SNAPSHOT_ROWS: usize = 60;

/// Indicator values for one trading day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub sma_20: Option<f64>,
    pub ema_20: f64,
    pub rsi_14: Option<f64>,
}

impl IndicatorRow {
    /// True when every indicator is defined
    pub fn is_complete(&self) -> bool {
        self.sma_20.is_some() && self.rsi_14.is_some()
    }
}

/// Computes SMA(20), EMA(20) and RSI(14)
///
/// The engine is stateless: each call builds fresh accumulators, so repeated
/// calls over the same series return identical rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorEngine;

impl IndicatorEngine {
    pub fn new() -> Self {
        Self
    }

    /// One row per observation, in date order
    pub fn compute(&self, series: &PriceSeries) -> Result<Vec<IndicatorRow>> {
        let mut sma = SimpleMovingAverage::new(SMA_PERIOD)?;
        let mut ema = ExponentialMovingAverage::new(EMA_PERIOD)?;
        let mut rsi = RelativeStrengthIndex::new(RSI_PERIOD)?;

        let mut rows = Vec::with_capacity(series.len());
        for point in series.points() {
            sma.update(point.close)?;
            ema.update(point.close)?;
            rsi.update(point.close)?;

            rows.push(IndicatorRow {
                date: point.date,
                close: point.close,
                sma_20: sma.current(),
                ema_20: ema.value()?,
                rsi_14: rsi.current(),
            });
        }

        Ok(rows)
    }

    /// The most recent `limit` complete rows, oldest first
    pub fn snapshot(&self, series: &PriceSeries, limit: usize) -> Result<Vec<IndicatorRow>> {
        let rows = self.compute(series)?;
        Ok(latest_complete(&rows, limit))
    }
}

/// Drop rows with any missing indicator and keep the last `limit`
pub fn latest_complete(rows: &[IndicatorRow], limit: usize) -> Vec<IndicatorRow> {
    let complete: Vec<IndicatorRow> = rows.iter().filter(|r| r.is_complete()).copied().collect();
    let skip = complete.len().saturating_sub(limit);
    complete.into_iter().skip(skip).collect()
}
