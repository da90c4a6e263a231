//! Moving average calculation implementations
//!
//! Contains implementations of the moving averages used by the indicator engine:
//! - Simple Moving Average (SMA) over a trailing window
//! - Exponential Moving Average (EMA) seeded with the first observation

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
///
/// The window is trailing and inclusive of the latest value, so the average is
/// only defined once `period` values have been seen.
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Update the SMA with a new value
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "SMA input must be finite, got {}",
                value
            )));
        }

        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }

        Ok(())
    }

    /// Get the current SMA value
    pub fn value(&self) -> Result<f64> {
        if self.values.len() < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for SMA calculation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        Ok(self.sum / self.period as f64)
    }

    /// Current SMA value, `None` while the window is still filling
    pub fn current(&self) -> Option<f64> {
        self.value().ok()
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the SMA, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
        self.sum = 0.0;
    }
}

/// Exponential Moving Average (EMA) implementation
///
/// Uses the recursive form `ema = alpha * value + (1 - alpha) * ema` with
/// `alpha = 2 / (period + 1)`. The first observation seeds the average and no
/// bias correction is applied, so a value is available after a single update.
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    period: usize,
    alpha: f64,
    current_ema: Option<f64>,
}

impl ExponentialMovingAverage {
    /// Create a new Exponential Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
            current_ema: None,
        })
    }

    /// Update the EMA with a new value
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "EMA input must be finite, got {}",
                value
            )));
        }

        self.current_ema = Some(match self.current_ema {
            None => value,
            Some(previous) => self.alpha * value + (1.0 - self.alpha) * previous,
        });

        Ok(())
    }

    /// Get the current EMA value
    pub fn value(&self) -> Result<f64> {
        self.current_ema.ok_or_else(|| {
            MathError::InsufficientData("EMA has not seen any values yet".to_string())
        })
    }

    /// Smoothing factor
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the EMA, clearing all values
    pub fn reset(&mut self) {
        self.current_ema = None;
    }
}
