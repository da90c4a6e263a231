//! # Stock Insights
//!
//! Workspace facade re-exporting the forecasting core and its math crate.
//!
//! ## Example
//!
//! ```
//! use stock_insights_workspace::forecast::{Action, RecommendationEngine};
//!
//! let (change, action) = RecommendationEngine::new().classify(100.0, 104.0).unwrap();
//! assert_eq!(action, Action::Buy);
//! assert!((change - 4.0).abs() < 1e-9);
//! ```

pub use stock_forecast as forecast;
pub use trade_math as math;
