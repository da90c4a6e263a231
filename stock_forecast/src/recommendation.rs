//! Buy/hold/sell classification from a predicted price change

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Predicted rise (in percent) at or above which buying is recommended
pub const BUY_THRESHOLD_PERCENT: f64 = 3.0;
/// Predicted fall (in percent) at or below which selling is recommended
pub const SELL_THRESHOLD_PERCENT: f64 = -3.0;

/// Absorbs float noise at the thresholds
const THRESHOLD_TOLERANCE: f64 = 1e-9;

/// Recommended action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Predicted rise of at least 3%
    Buy,
    /// Predicted move within ±3%
    Hold,
    /// Predicted fall of at least 3%
    Sell,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Buy => "buy",
            Action::Hold => "hold",
            Action::Sell => "sell",
        };
        f.write_str(label)
    }
}

/// Classified outcome for one symbol and target date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub symbol: String,
    pub target_date: NaiveDate,
    pub predicted_price: f64,
    pub current_price: f64,
    pub change_percent: f64,
    pub action: Action,
}

/// Stateless threshold classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Percentage change from `current_price` to `predicted_price` and the
    /// resulting action
    pub fn classify(&self, current_price: f64, predicted_price: f64) -> Result<(f64, Action)> {
        if !current_price.is_finite() || !predicted_price.is_finite() {
            return Err(ForecastError::InvalidInput(format!(
                "prices must be finite (current {}, predicted {})",
                current_price, predicted_price
            )));
        }
        if current_price == 0.0 {
            return Err(ForecastError::InvalidInput(
                "current price must not be zero".to_string(),
            ));
        }

        let change_percent = (predicted_price - current_price) * 100.0 / current_price;

        let action = if change_percent >= BUY_THRESHOLD_PERCENT - THRESHOLD_TOLERANCE {
            Action::Buy
        } else if change_percent <= SELL_THRESHOLD_PERCENT + THRESHOLD_TOLERANCE {
            Action::Sell
        } else {
            Action::Hold
        };

        Ok((change_percent, action))
    }

    /// Classify and package the full recommendation
    pub fn recommend(
        &self,
        symbol: &str,
        target_date: NaiveDate,
        current_price: f64,
        predicted_price: f64,
    ) -> Result<Recommendation> {
        let (change_percent, action) = self.classify(current_price, predicted_price)?;
        Ok(Recommendation {
            symbol: symbol.to_string(),
            target_date,
            predicted_price,
            current_price,
            change_percent,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_are_inclusive() {
        let engine = RecommendationEngine::new();

        let (change, action) = engine.classify(100.0, 103.0).unwrap();
        assert!((change - 3.0).abs() < 1e-12);
        assert_eq!(action, Action::Buy);

        assert_eq!(engine.classify(100.0, 97.0).unwrap().1, Action::Sell);
        assert_eq!(engine.classify(100.0, 102.99).unwrap().1, Action::Hold);
    }

    #[test]
    fn test_action_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Action::Hold).unwrap(), "\"hold\"");
        assert_eq!(Action::Sell.to_string(), "sell");
    }

    #[test]
    fn test_non_finite_rejected() {
        let engine = RecommendationEngine::new();
        assert!(engine.classify(f64::NAN, 1.0).is_err());
        assert!(engine.classify(1.0, f64::INFINITY).is_err());
    }
}
