use crate::fetcher::{MarketDataProvider, ProviderError, RawBar};
use crate::utils::date_parser;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Daily bars read from `<dir>/<SYMBOL>.csv`
///
/// The header must contain `Date` and `Close`; `Open`, `High`, `Low` and
/// `Volume` are optional. Header matching ignores case, and `Adj Close` is not
/// treated as the close.
#[derive(Debug, Clone)]
pub struct CsvDirectoryProvider {
    dir: PathBuf,
}

#[derive(Debug, Default)]
struct Columns {
    date: Option<usize>,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
    volume: Option<usize>,
}

impl Columns {
    fn detect(headers: &csv::StringRecord) -> Self {
        let mut columns = Columns::default();
        for (i, name) in headers.iter().enumerate() {
            match name.trim().to_lowercase().as_str() {
                "date" | "timestamp" | "time" => columns.date = columns.date.or(Some(i)),
                "open" => columns.open = Some(i),
                "high" => columns.high = Some(i),
                "low" => columns.low = Some(i),
                "close" => columns.close = Some(i),
                "volume" => columns.volume = Some(i),
                _ => {}
            }
        }
        columns
    }
}

fn parse_number(record: &csv::StringRecord, index: Option<usize>) -> Option<f64> {
    let raw = record.get(index?)?.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl CsvDirectoryProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the per-symbol files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol))
    }

    /// Parse CSV text into raw bars
    pub fn parse_bars(contents: &str) -> Result<Vec<RawBar>, ProviderError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| ProviderError::Parse(e.to_string()))?
            .clone();
        let columns = Columns::detect(&headers);

        let (Some(date_col), Some(_)) = (columns.date, columns.close) else {
            return Err(ProviderError::Parse(
                "CSV header needs Date and Close columns".to_string(),
            ));
        };

        let mut bars = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ProviderError::Parse(e.to_string()))?;
            let raw_date = record.get(date_col).unwrap_or_default();
            let date = date_parser::parse_date(raw_date)
                .map_err(|e| ProviderError::Parse(e.to_string()))?;

            bars.push(RawBar {
                date,
                open: parse_number(&record, columns.open),
                high: parse_number(&record, columns.high),
                low: parse_number(&record, columns.low),
                close: parse_number(&record, columns.close),
                volume: parse_number(&record, columns.volume),
            });
        }

        Ok(bars)
    }
}

#[async_trait]
impl MarketDataProvider for CsvDirectoryProvider {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, ProviderError> {
        let path = self.path_for(symbol);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProviderError::NotFound(format!(
                    "{} ({})",
                    symbol,
                    path.display()
                )))
            }
            Err(err) => return Err(err.into()),
        };

        let bars = Self::parse_bars(&contents)?;
        Ok(bars
            .into_iter()
            .filter(|bar| bar.date >= start && bar.date <= end)
            .collect())
    }
}
