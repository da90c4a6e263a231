//! Retrieval of daily price history from a market-data provider
//!
//! Providers return raw, possibly gappy multi-column bars. [`TimeSeriesFetcher`]
//! normalises them into a validated [`PriceSeries`] of `(date, close)` pairs,
//! or into full [`Candle`]s for the chart path.

use crate::data::{Candle, PricePoint, PriceSeries};
use crate::error::{ForecastError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod csv_file;
pub mod memory;
pub mod yahoo;

pub use csv_file::CsvDirectoryProvider;
pub use memory::InMemoryProvider;
pub use yahoo::YahooChartProvider;

/// One upstream daily row; any column may be missing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl RawBar {
    /// A bar carrying only a close
    pub fn close_only(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: Some(close),
            volume: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("symbol not found: {0}")]
    NotFound(String),

    #[error("rate limited")]
    RateLimited,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of daily bars for a symbol
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &'static str;

    /// Fetch daily bars for `symbol` covering `[start, end]`
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> std::result::Result<Vec<RawBar>, ProviderError>;
}

/// Fetches and normalises daily history through a [`MarketDataProvider`]
#[derive(Clone)]
pub struct TimeSeriesFetcher {
    provider: Arc<dyn MarketDataProvider>,
}

impl std::fmt::Debug for TimeSeriesFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeSeriesFetcher")
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl TimeSeriesFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Daily closes for `symbol` over `[start, end]`.
    ///
    /// Fails with [`ForecastError::DataUnavailable`] when the provider errors
    /// or no usable close survives normalisation. No retries are attempted.
    pub async fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        let symbol = normalize_symbol(symbol)?;
        check_range(start, end)?;

        let started = Instant::now();
        let bars = self.fetch_bars(&symbol, start, end).await?;
        let raw_rows = bars.len();
        let points = normalize_closes(bars, start, end);

        if points.len() < raw_rows {
            warn!(
                symbol = %symbol,
                dropped = raw_rows - points.len(),
                "dropped upstream rows without a usable close"
            );
        }
        if points.is_empty() {
            return Err(ForecastError::DataUnavailable(format!(
                "{} returned no usable closes for {} between {} and {}",
                self.provider.name(),
                symbol,
                start,
                end
            )));
        }

        info!(
            symbol = %symbol,
            provider = self.provider.name(),
            rows = points.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched daily closes"
        );

        PriceSeries::with_range(symbol, start, end, points)
    }

    /// Full OHLC bars for `symbol` over `[start, end]`; rows missing any price are dropped
    pub async fn fetch_candles(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Candle>> {
        let symbol = normalize_symbol(symbol)?;
        check_range(start, end)?;

        let bars = self.fetch_bars(&symbol, start, end).await?;
        let candles = normalize_candles(bars, start, end);

        if candles.is_empty() {
            return Err(ForecastError::DataUnavailable(format!(
                "{} returned no complete bars for {} between {} and {}",
                self.provider.name(),
                symbol,
                start,
                end
            )));
        }

        debug!(symbol = %symbol, rows = candles.len(), "fetched candles");
        Ok(candles)
    }

    async fn fetch_bars(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawBar>> {
        self.provider
            .fetch_daily_bars(symbol, start, end)
            .await
            .map_err(|err| {
                warn!(symbol = %symbol, provider = self.provider.name(), error = %err, "upstream fetch failed");
                ForecastError::DataUnavailable(format!("{}: {}", symbol, err))
            })
    }
}

/// Trim and upper-case a ticker symbol
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(ForecastError::InvalidInput(
            "symbol must not be empty".to_string(),
        ));
    }
    Ok(symbol.to_uppercase())
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(ForecastError::InvalidInput(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }
    Ok(())
}

fn usable_price(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Reduce raw bars to sorted, de-duplicated `(date, close)` pairs inside `[start, end]`.
///
/// Rows without a positive finite close are dropped; for repeated dates the
/// last row wins.
pub fn normalize_closes(mut bars: Vec<RawBar>, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
    bars.sort_by_key(|bar| bar.date);

    let mut points: Vec<PricePoint> = Vec::with_capacity(bars.len());
    for bar in bars {
        if bar.date < start || bar.date > end {
            continue;
        }
        let Some(close) = usable_price(bar.close) else {
            continue;
        };
        match points.last_mut() {
            Some(last) if last.date == bar.date => last.close = close,
            _ => points.push(PricePoint::new(bar.date, close)),
        }
    }
    points
}

fn normalize_candles(mut bars: Vec<RawBar>, start: NaiveDate, end: NaiveDate) -> Vec<Candle> {
    bars.sort_by_key(|bar| bar.date);

    let mut candles: Vec<Candle> = Vec::with_capacity(bars.len());
    for bar in bars {
        if bar.date < start || bar.date > end {
            continue;
        }
        let (Some(open), Some(high), Some(low), Some(close)) = (
            usable_price(bar.open),
            usable_price(bar.high),
            usable_price(bar.low),
            usable_price(bar.close),
        ) else {
            continue;
        };
        let candle = Candle {
            date: bar.date,
            open,
            high,
            low,
            close,
            volume: bar.volume.filter(|v| v.is_finite() && *v >= 0.0),
        };
        match candles.last_mut() {
            Some(last) if last.date == bar.date => *last = candle,
            _ => candles.push(candle),
        }
    }
    candles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_normalize_closes_sorts_filters_and_dedupes() {
        let bars = vec![
            RawBar::close_only(date("2024-01-04"), 12.0),
            RawBar::close_only(date("2024-01-02"), 10.0),
            RawBar {
                close: None,
                ..RawBar::close_only(date("2024-01-03"), 0.0)
            },
            RawBar::close_only(date("2024-01-04"), 12.5),
            RawBar::close_only(date("2023-12-29"), 9.0),
            RawBar::close_only(date("2024-01-05"), f64::NAN),
        ];

        let points = normalize_closes(bars, date("2024-01-01"), date("2024-01-31"));
        assert_eq!(
            points,
            vec![
                PricePoint::new(date("2024-01-02"), 10.0),
                PricePoint::new(date("2024-01-04"), 12.5),
            ]
        );
    }

    #[test]
    fn test_normalize_candles_requires_all_prices() {
        let full = RawBar {
            date: date("2024-01-02"),
            open: Some(10.0),
            high: Some(11.0),
            low: Some(9.5),
            close: Some(10.5),
            volume: Some(1000.0),
        };
        let partial = RawBar {
            high: None,
            date: date("2024-01-03"),
            ..full
        };

        let candles = normalize_candles(vec![full, partial], date("2024-01-01"), date("2024-01-31"));
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].high, 11.0);
        assert_eq!(candles[0].volume, Some(1000.0));
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("  msft ").unwrap(), "MSFT");
        assert!(normalize_symbol("   ").is_err());
    }
}
