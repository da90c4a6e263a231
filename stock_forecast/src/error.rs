//! Error types for the stock_forecast crate

use crate::fetcher::ProviderError;
use thiserror::Error;

/// Custom error types for the stock_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// No usable historical data for the symbol (empty result or upstream failure)
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Neither an exact nor a fallback forecast row matched the query
    #[error("No forecast available: {0}")]
    NoForecastAvailable(String),

    /// Caller supplied an argument outside the accepted domain
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error from the indicator / regression math
    #[error("Math error: {0}")]
    MathError(#[from] trade_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A blocking model-fitting task panicked or was cancelled
    #[error("Worker task failed: {0}")]
    TaskError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<ProviderError> for ForecastError {
    fn from(err: ProviderError) -> Self {
        ForecastError::DataUnavailable(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ForecastError {
    fn from(err: tokio::task::JoinError) -> Self {
        ForecastError::TaskError(err.to_string())
    }
}
