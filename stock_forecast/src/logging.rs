//! Tracing subscriber setup for binaries

use crate::error::{ForecastError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub log_level: String,
    /// Single-line compact output instead of the default multi-field format
    pub compact: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            compact: false,
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup. Unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = lookup("RUST_LOG") {
            config.log_level = level;
        }
        if let Some(v) = lookup("STOCK_INSIGHTS_LOG_COMPACT") {
            config.compact = v.trim().parse().map_err(|_| {
                ForecastError::ConfigError(format!(
                    "STOCK_INSIGHTS_LOG_COMPACT has an invalid value '{}', expected 'true' or 'false'",
                    v
                ))
            })?;
        }

        Ok(config)
    }
}

/// Install the global subscriber. Called once by binaries; the library only emits events.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level).map_err(|e| {
        ForecastError::ConfigError(format!("invalid log filter '{}': {}", config.log_level, e))
    })?;

    let installed = if config.compact {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    installed.map_err(|e| ForecastError::ConfigError(format!("logging already initialised: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_flag_from_lookup() {
        let config = LoggingConfig::from_lookup(|name: &str| match name {
            "STOCK_INSIGHTS_LOG_COMPACT" => Some(" true".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(config.compact);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_bad_compact_flag_is_config_error() {
        let result = LoggingConfig::from_lookup(|name: &str| match name {
            "STOCK_INSIGHTS_LOG_COMPACT" => Some("yes".to_string()),
            _ => None,
        });
        assert!(matches!(result, Err(ForecastError::ConfigError(_))));
    }

    #[test]
    fn test_bad_filter_is_config_error() {
        let config = LoggingConfig {
            log_level: "stock_forecast=notalevel".to_string(),
            compact: false,
        };
        assert!(matches!(init_logging(config), Err(ForecastError::ConfigError(_))));
    }
}
