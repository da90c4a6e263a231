use crate::fetcher::{MarketDataProvider, ProviderError, RawBar};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
enum Entry {
    Bars(Vec<RawBar>),
    Failure(String),
}

/// Provider serving fixed bars from memory, for offline runs and tests
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    entries: HashMap<String, Entry>,
    calls: AtomicUsize,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bars` for `symbol`
    pub fn with_bars(mut self, symbol: &str, bars: Vec<RawBar>) -> Self {
        self.entries
            .insert(symbol.to_uppercase(), Entry::Bars(bars));
        self
    }

    /// Serve close-only bars for `symbol`
    pub fn with_closes(self, symbol: &str, closes: &[(NaiveDate, f64)]) -> Self {
        let bars = closes
            .iter()
            .map(|&(date, close)| RawBar::close_only(date, close))
            .collect();
        self.with_bars(symbol, bars)
    }

    /// Make every request for `symbol` fail with a network error
    pub fn with_failure(mut self, symbol: &str, message: &str) -> Self {
        self.entries
            .insert(symbol.to_uppercase(), Entry::Failure(message.to_string()));
        self
    }

    /// Number of fetches served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.entries.get(&symbol.to_uppercase()) {
            Some(Entry::Bars(bars)) => Ok(bars
                .iter()
                .filter(|bar| bar.date >= start && bar.date <= end)
                .copied()
                .collect()),
            Some(Entry::Failure(message)) => Err(ProviderError::Network(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}
