//! Runtime configuration read from the environment

use crate::error::{ForecastError, Result};
use crate::fetcher::yahoo::DEFAULT_CHART_URL;
use crate::fetcher::{CsvDirectoryProvider, MarketDataProvider, YahooChartProvider};
use crate::indicators::SNAPSHOT_ROWS;
use crate::models::AdditiveModelConfig;
use crate::utils::date_parser::parse_date;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Where daily history comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Yahoo,
    /// One `<SYMBOL>.csv` per ticker in a local directory
    Csv,
}

impl FromStr for ProviderKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(ProviderKind::Yahoo),
            "csv" => Ok(ProviderKind::Csv),
            other => Err(ForecastError::ConfigError(format!(
                "unknown provider '{}', expected 'yahoo' or 'csv'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightsConfig {
    pub provider: ProviderKind,
    pub csv_dir: Option<PathBuf>,
    pub yahoo_base_url: String,
    pub http_timeout: Duration,
    /// First day of history fetched for forecasts and indicators
    pub history_start: NaiveDate,
    /// Minimum horizon forecast by the analysis path
    pub analysis_horizon_days: i64,
    /// Forecast rows returned with an analysis
    pub analysis_slice_len: usize,
    pub snapshot_rows: usize,
    /// Default window for recent candles
    pub candle_days: i64,
    pub model: AdditiveModelConfig,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Yahoo,
            csv_dir: None,
            yahoo_base_url: DEFAULT_CHART_URL.to_string(),
            http_timeout: Duration::from_secs(30),
            history_start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            analysis_horizon_days: 14,
            analysis_slice_len: 7,
            snapshot_rows: SNAPSHOT_ROWS,
            candle_days: 30,
            model: AdditiveModelConfig::default(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ForecastError::ConfigError(format!("{} has an invalid value '{}'", name, value)))
}

impl InsightsConfig {
    /// Read the process environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("STOCK_INSIGHTS_PROVIDER") {
            config.provider = v.parse()?;
        }
        config.csv_dir = lookup("STOCK_INSIGHTS_CSV_DIR").map(PathBuf::from);
        if let Some(v) = lookup("YAHOO_CHART_BASE_URL") {
            config.yahoo_base_url = v;
        }
        if let Some(v) = lookup("STOCK_INSIGHTS_HTTP_TIMEOUT_SECS") {
            config.http_timeout = Duration::from_secs(parse_var("STOCK_INSIGHTS_HTTP_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = lookup("STOCK_INSIGHTS_HISTORY_START") {
            config.history_start = parse_date(&v).map_err(|e| {
                ForecastError::ConfigError(format!("STOCK_INSIGHTS_HISTORY_START: {}", e))
            })?;
        }
        if let Some(v) = lookup("STOCK_INSIGHTS_ANALYSIS_HORIZON_DAYS") {
            config.analysis_horizon_days = parse_var("STOCK_INSIGHTS_ANALYSIS_HORIZON_DAYS", &v)?;
        }
        if let Some(v) = lookup("STOCK_INSIGHTS_UNCERTAINTY_SAMPLES") {
            config.model.uncertainty_samples = parse_var("STOCK_INSIGHTS_UNCERTAINTY_SAMPLES", &v)?;
        }
        if let Some(v) = lookup("STOCK_INSIGHTS_INTERVAL_WIDTH") {
            config.model.interval_width = parse_var("STOCK_INSIGHTS_INTERVAL_WIDTH", &v)?;
        }
        if let Some(v) = lookup("STOCK_INSIGHTS_SEED") {
            config.model.seed = Some(parse_var("STOCK_INSIGHTS_SEED", &v)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.provider == ProviderKind::Csv && self.csv_dir.is_none() {
            return Err(ForecastError::ConfigError(
                "STOCK_INSIGHTS_CSV_DIR is required for the csv provider".to_string(),
            ));
        }
        if self.http_timeout.is_zero() {
            return Err(ForecastError::ConfigError(
                "HTTP timeout must be at least one second".to_string(),
            ));
        }
        if self.analysis_horizon_days <= 0 {
            return Err(ForecastError::ConfigError(format!(
                "analysis horizon must be positive, got {}",
                self.analysis_horizon_days
            )));
        }
        if self.candle_days <= 0 {
            return Err(ForecastError::ConfigError(format!(
                "candle window must be positive, got {}",
                self.candle_days
            )));
        }
        self.model
            .validate()
            .map_err(|e| ForecastError::ConfigError(e.to_string()))
    }

    /// Instantiate the configured market data provider
    pub fn build_provider(&self) -> Result<Arc<dyn MarketDataProvider>> {
        match self.provider {
            ProviderKind::Yahoo => {
                let provider = YahooChartProvider::new(self.yahoo_base_url.clone(), self.http_timeout)
                    .map_err(|e| ForecastError::ConfigError(e.to_string()))?;
                Ok(Arc::new(provider))
            }
            ProviderKind::Csv => {
                let dir = self.csv_dir.clone().ok_or_else(|| {
                    ForecastError::ConfigError("csv provider needs a directory".to_string())
                })?;
                Ok(Arc::new(CsvDirectoryProvider::new(dir)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = InsightsConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, InsightsConfig::default());
        assert_eq!(config.history_start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(config.model.uncertainty_samples, 1000);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = InsightsConfig::from_lookup(lookup(&[
            ("STOCK_INSIGHTS_PROVIDER", "csv"),
            ("STOCK_INSIGHTS_CSV_DIR", "/tmp/prices"),
            ("STOCK_INSIGHTS_SEED", "7"),
            ("STOCK_INSIGHTS_INTERVAL_WIDTH", "0.9"),
            ("STOCK_INSIGHTS_HISTORY_START", "2018-06-01"),
        ]))
        .unwrap();

        assert_eq!(config.provider, ProviderKind::Csv);
        assert_eq!(config.csv_dir, Some(PathBuf::from("/tmp/prices")));
        assert_eq!(config.model.seed, Some(7));
        assert_eq!(config.model.interval_width, 0.9);
        assert_eq!(config.history_start, NaiveDate::from_ymd_opt(2018, 6, 1).unwrap());
    }

    #[test]
    fn test_csv_without_dir_is_rejected() {
        let err = InsightsConfig::from_lookup(lookup(&[("STOCK_INSIGHTS_PROVIDER", "csv")])).unwrap_err();
        assert!(matches!(err, ForecastError::ConfigError(_)));
    }

    #[test]
    fn test_bad_number_is_rejected() {
        assert!(InsightsConfig::from_lookup(lookup(&[("STOCK_INSIGHTS_SEED", "abc")])).is_err());
        assert!(InsightsConfig::from_lookup(lookup(&[("STOCK_INSIGHTS_INTERVAL_WIDTH", "2")])).is_err());
    }
}
