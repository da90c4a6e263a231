use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use stock_forecast::logging::{init_logging, LoggingConfig};
use stock_forecast::utils::date_parser::parse_date;
use stock_forecast::{InsightsConfig, StockInsights};

#[derive(Debug, Parser)]
#[command(name = "stock_insights", version, about = "Indicators, forecasts and recommendations for daily stock closes")]
struct Args {
    /// Seed for reproducible prediction intervals (overrides STOCK_INSIGHTS_SEED)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Evaluation date (YYYY-MM-DD). Defaults to today in UTC.
    #[arg(long, global = true)]
    as_of: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Latest complete SMA/EMA/RSI rows
    Snapshot { symbol: String },
    /// Fitted history plus a projection
    Forecast {
        symbol: String,
        #[arg(long, default_value_t = 30)]
        horizon: i64,
    },
    /// Buy/hold/sell recommendation for a date in the future
    Analyze {
        symbol: String,
        #[arg(long, default_value_t = 7)]
        days_ahead: i64,
    },
    /// Forecast for one exact date
    Predict {
        symbol: String,
        #[arg(long)]
        date: String,
    },
    /// Recent daily OHLC bars
    Candles {
        symbol: String,
        #[arg(long)]
        days: Option<i64>,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging(LoggingConfig::from_env()?)?;

    let args = Args::parse();

    let mut config = InsightsConfig::from_env().context("invalid configuration")?;
    if let Some(seed) = args.seed {
        config.model.seed = Some(seed);
    }
    let candle_days = config.candle_days;

    let today: NaiveDate = match args.as_of.as_deref() {
        Some(value) => parse_date(value).context("invalid --as-of date")?,
        None => StockInsights::today(),
    };

    let insights = StockInsights::from_config(config)?;

    match args.command {
        Command::Snapshot { symbol } => {
            print_json(&insights.get_technical_snapshot_as_of(&symbol, today).await?)
        }
        Command::Forecast { symbol, horizon } => {
            print_json(&insights.get_forecast_as_of(&symbol, horizon, today).await?)
        }
        Command::Analyze { symbol, days_ahead } => {
            let analysis = insights.get_analysis_as_of(&symbol, days_ahead, today).await?;
            tracing::info!(symbol = %analysis.symbol, "{}", analysis.message);
            print_json(&analysis)
        }
        Command::Predict { symbol, date } => {
            let target = parse_date(&date).context("invalid --date")?;
            print_json(&insights.get_prediction_as_of(&symbol, target, today).await?)
        }
        Command::Candles { symbol, days } => {
            let days = days.unwrap_or(candle_days);
            print_json(&insights.get_recent_candles_as_of(&symbol, days, today).await?)
        }
    }
}
