//! Oscillator indicator implementations
//!
//! Contains the Relative Strength Index (RSI) computed over a simple trailing
//! window of gains and losses.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// RSI reported when the window holds gains but no losses.
pub const RSI_ALL_GAINS: f64 = 100.0;
/// RSI reported when the window holds neither gains nor losses (flat prices).
pub const RSI_FLAT: f64 = 50.0;

/// Relative Strength Index (RSI) implementation
///
/// Average gain and average loss are plain means over the trailing `period`
/// price deltas (no Wilder smoothing). The first price contributes a zero
/// delta, so the window is full after `period` updates.
///
/// Division by zero is resolved explicitly rather than through floating point:
/// an average loss of zero yields [`RSI_ALL_GAINS`] when there were gains and
/// [`RSI_FLAT`] when the window is completely flat.
#[derive(Debug, Clone)]
pub struct RelativeStrengthIndex {
    period: usize,
    previous_price: Option<f64>,
    gains: VecDeque<f64>,
    losses: VecDeque<f64>,
}

impl RelativeStrengthIndex {
    /// Create a new RSI with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            previous_price: None,
            gains: VecDeque::with_capacity(period + 1),
            losses: VecDeque::with_capacity(period + 1),
        })
    }

    /// Update the RSI with a new price value
    pub fn update(&mut self, price: f64) -> Result<()> {
        if !price.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "RSI input must be finite, got {}",
                price
            )));
        }

        let change = match self.previous_price {
            Some(prev_price) => price - prev_price,
            None => 0.0,
        };

        self.gains.push_back(change.max(0.0));
        self.losses.push_back((-change).max(0.0));

        if self.gains.len() > self.period {
            self.gains.pop_front();
            self.losses.pop_front();
        }

        self.previous_price = Some(price);

        Ok(())
    }

    /// Get the current RSI value (0-100)
    pub fn value(&self) -> Result<f64> {
        if self.gains.len() < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for RSI calculation. Need {} values, have {}.",
                self.period,
                self.gains.len()
            )));
        }

        let avg_gain = self.gains.iter().sum::<f64>() / self.period as f64;
        let avg_loss = self.losses.iter().sum::<f64>() / self.period as f64;

        if avg_loss == 0.0 {
            return Ok(if avg_gain > 0.0 { RSI_ALL_GAINS } else { RSI_FLAT });
        }

        let rs = avg_gain / avg_loss;
        Ok((100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0))
    }

    /// Current RSI value, `None` while the window is still filling
    pub fn current(&self) -> Option<f64> {
        self.value().ok()
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the RSI, clearing all values
    pub fn reset(&mut self) {
        self.previous_price = None;
        self.gains.clear();
        self.losses.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rsi_calculation() {
        let mut rsi = RelativeStrengthIndex::new(3).unwrap();

        rsi.update(10.0).unwrap();
        rsi.update(10.5).unwrap();
        assert!(rsi.value().is_err());

        // Window of deltas: [0.0, +0.5, +0.5]
        rsi.update(11.0).unwrap();
        assert_relative_eq!(rsi.value().unwrap(), RSI_ALL_GAINS);

        // Window of deltas: [+0.5, +0.5, -0.5] -> RS = 2, RSI = 66.67
        rsi.update(10.5).unwrap();
        assert_relative_eq!(rsi.value().unwrap(), 100.0 - 100.0 / 3.0, epsilon = 1e-9);

        // Downtrend lowers the RSI
        let before = rsi.value().unwrap();
        rsi.update(10.0).unwrap();
        assert!(rsi.value().unwrap() < before);
    }

    #[test]
    fn test_rsi_flat_window_is_neutral() {
        let mut rsi = RelativeStrengthIndex::new(4).unwrap();
        for _ in 0..6 {
            rsi.update(42.0).unwrap();
        }
        assert_relative_eq!(rsi.value().unwrap(), RSI_FLAT);
    }

    #[test]
    fn test_rsi_only_losses_is_zero() {
        let mut rsi = RelativeStrengthIndex::new(3).unwrap();
        for price in [10.0, 9.0, 8.0, 7.0] {
            rsi.update(price).unwrap();
        }
        assert_relative_eq!(rsi.value().unwrap(), 0.0);
    }

    #[test]
    fn test_rsi_stays_in_bounds() {
        let mut rsi = RelativeStrengthIndex::new(14).unwrap();
        let mut price = 100.0;
        for i in 0..200 {
            price += ((i * 7919) % 13) as f64 - 6.0;
            rsi.update(price.max(1.0)).unwrap();
            if let Some(value) = rsi.current() {
                assert!((0.0..=100.0).contains(&value));
            }
        }
    }
}
