#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use stock_forecast::{PricePoint, PriceSeries};

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// One close per calendar day starting at `start`
pub fn daily_closes(start: &str, closes: &[f64]) -> Vec<(NaiveDate, f64)> {
    let start = date(start);
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| (start + Duration::days(i as i64), c))
        .collect()
}

pub fn series(symbol: &str, start: &str, closes: &[f64]) -> PriceSeries {
    let points = daily_closes(start, closes)
        .into_iter()
        .map(|(d, c)| PricePoint::new(d, c))
        .collect();
    PriceSeries::new(symbol, points).unwrap()
}

/// Deterministic wavy closes around a gentle uptrend
pub fn wavy_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.05 * t + 3.0 * (t / 9.0).sin() + 1.5 * (t / 3.7).cos()
        })
        .collect()
}
