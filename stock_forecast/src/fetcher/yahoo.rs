use crate::fetcher::{MarketDataProvider, ProviderError, RawBar};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Daily bars from the Yahoo Finance chart API
#[derive(Debug, Clone)]
pub struct YahooChartProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooChartProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stock-insights/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        // period2 is exclusive, so ask for the whole end day
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end.and_time(NaiveTime::MIN).and_utc().timestamp() + 86_400;

        format!(
            "{}/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url.trim_end_matches('/'),
            symbol,
            period1,
            period2
        )
    }
}

// Minimal response structs (only what we need)
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

fn column(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

fn parse_chart(body: ChartResponse, symbol: &str) -> Result<Vec<RawBar>, ProviderError> {
    if let Some(error) = body.chart.error {
        let description = error.description.unwrap_or_default();
        return match error.code.as_deref() {
            Some("Not Found") => Err(ProviderError::NotFound(symbol.to_string())),
            _ => Err(ProviderError::BadResponse(description)),
        };
    }

    let result = body
        .chart
        .result
        .and_then(|mut r| r.pop())
        .ok_or_else(|| ProviderError::BadResponse("missing result".into()))?;

    let offset = result.meta.map(|m| m.gmtoffset).unwrap_or(0);
    let quote = result
        .indicators
        .quote
        .first()
        .ok_or_else(|| ProviderError::BadResponse("missing quote".into()))?;

    // timestamp aligns with the quote columns by index
    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let local = DateTime::from_timestamp(ts + offset, 0)
            .ok_or_else(|| ProviderError::Parse(format!("bad timestamp {}", ts)))?;

        bars.push(RawBar {
            date: local.date_naive(),
            open: column(&quote.open, i),
            high: column(&quote.high, i),
            low: column(&quote.low, i),
            close: column(&quote.close, i),
            volume: column(&quote.volume, i),
        });
    }

    Ok(bars)
}

#[async_trait]
impl MarketDataProvider for YahooChartProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, ProviderError> {
        let resp = self
            .client
            .get(self.url(symbol, start, end))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        match resp.status() {
            reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(ProviderError::RateLimited),
            reqwest::StatusCode::NOT_FOUND => {
                return Err(ProviderError::NotFound(symbol.to_string()))
            }
            status if !status.is_success() => {
                return Err(ProviderError::BadResponse(format!("HTTP {}", status)))
            }
            _ => {}
        }

        let body = resp
            .json::<ChartResponse>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        parse_chart(body, symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chart_keeps_gaps_as_none() {
        let json = r#"{
            "chart": {
                "result": [{
                    "meta": {"gmtoffset": -18000},
                    "timestamp": [1704205800, 1704292200],
                    "indicators": {"quote": [{
                        "open": [187.15, 184.22],
                        "high": [188.44, 185.88],
                        "low": [183.89, 183.43],
                        "close": [185.64, null],
                        "volume": [82488700, 58414500]
                    }]}
                }],
                "error": null
            }
        }"#;

        let body: ChartResponse = serde_json::from_str(json).unwrap();
        let bars = parse_chart(body, "AAPL").unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, "2024-01-02".parse::<NaiveDate>().unwrap());
        assert_eq!(bars[0].close, Some(185.64));
        assert_eq!(bars[1].date, "2024-01-03".parse::<NaiveDate>().unwrap());
        assert_eq!(bars[1].close, None);
        assert_eq!(bars[1].open, Some(184.22));
    }

    #[test]
    fn test_parse_chart_error_not_found() {
        let json = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let body: ChartResponse = serde_json::from_str(json).unwrap();

        assert!(matches!(
            parse_chart(body, "ZZZZ"),
            Err(ProviderError::NotFound(_))
        ));
    }

    #[test]
    fn test_url_covers_end_day() {
        let provider = YahooChartProvider::new(DEFAULT_CHART_URL, Duration::from_secs(5)).unwrap();
        let url = provider.url(
            "MSFT",
            "2024-01-01".parse().unwrap(),
            "2024-01-01".parse().unwrap(),
        );
        assert_eq!(
            url,
            "https://query1.finance.yahoo.com/v8/finance/chart/MSFT?period1=1704067200&period2=1704153600&interval=1d&events=history"
        );
    }
}
