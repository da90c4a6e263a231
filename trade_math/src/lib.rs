//! # Trade Math
//!
//! Numeric building blocks for the stock forecasting core.
//! This crate provides the rolling indicators (SMA, EMA, RSI) used for
//! technical snapshots and the penalized least-squares solver used to fit
//! the additive forecast model.

use thiserror::Error;

// Indicator modules
pub mod moving_averages;
pub mod oscillators;
// Least squares
pub mod regression;

/// Errors that can occur in trading-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = MathError::InsufficientData("need 20 values".to_string());
        assert_eq!(
            err.to_string(),
            "Insufficient data for calculation: need 20 values"
        );
    }
}
