mod common;

use chrono::{Datelike, Duration, Weekday};
use common::{date, series, wavy_closes};
use pretty_assertions::assert_eq;
use rstest::rstest;
use stock_forecast::models::MAX_HORIZON_DAYS;
use stock_forecast::{
    AdditiveModel, AdditiveModelConfig, ForecastEngine, ForecastError, ForecastWarning, PricePoint,
    PriceSeries,
};

fn engine_with_seed(seed: u64) -> ForecastEngine {
    ForecastEngine::new(AdditiveModel::new(AdditiveModelConfig::default().with_seed(seed)).unwrap())
}

/// Weekday closes following `100 + 0.1 * days_since_start`, five years long
fn linear_trading_days() -> PriceSeries {
    let start = date("2019-01-01");
    let points = (0..=1826)
        .map(|d| start + Duration::days(d))
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .map(|d| PricePoint::new(d, 100.0 + 0.1 * (d - start).num_days() as f64))
        .collect();
    PriceSeries::new("LIN", points).unwrap()
}

#[test]
fn test_linear_trend_is_extrapolated() {
    let s = linear_trading_days();
    let horizon = 30;
    let forecast = engine_with_seed(1).fit_and_predict(&s, horizon).unwrap();

    let last = forecast.last_row().unwrap();
    assert_eq!(last.date, s.last_date() + Duration::days(horizon));

    let expected = 100.0 + 0.1 * (last.date - date("2019-01-01")).num_days() as f64;
    assert!(
        (last.yhat - expected).abs() / expected < 0.05,
        "yhat {} vs trend {}",
        last.yhat,
        expected
    );
    assert!(forecast.summary.yearly_seasonality);
    assert!(forecast.warnings.is_empty());
}

#[rstest]
#[case::short(60, 10)]
#[case::medium(400, 30)]
#[case::long(800, 90)]
fn test_bounds_contain_point_forecast(#[case] days: usize, #[case] horizon: i64) {
    let s = series("WAVE", "2021-01-01", &wavy_closes(days));
    let forecast = engine_with_seed(3).fit_and_predict(&s, horizon).unwrap();

    assert_eq!(forecast.rows.len(), days + horizon as usize);
    assert_eq!(forecast.future_rows().len(), horizon as usize);
    for row in &forecast.rows {
        assert!(
            row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper,
            "{:?}",
            row
        );
    }
}

#[test]
fn test_same_seed_gives_identical_forecast() {
    let s = series("WAVE", "2021-01-01", &wavy_closes(300));

    let a = engine_with_seed(99).fit_and_predict(&s, 14).unwrap();
    let b = engine_with_seed(99).fit_and_predict(&s, 14).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_seed_only_moves_the_bounds() {
    let s = series("WAVE", "2021-01-01", &wavy_closes(300));

    let a = engine_with_seed(1).fit_and_predict(&s, 14).unwrap();
    let b = engine_with_seed(2).fit_and_predict(&s, 14).unwrap();

    for (x, y) in a.rows.iter().zip(&b.rows) {
        assert!((x.yhat - y.yhat).abs() < 1e-9);
    }
    assert_ne!(a.rows, b.rows);
}

#[test]
fn test_short_history_carries_warning() {
    let s = series("NEW", "2024-01-01", &wavy_closes(90));
    let forecast = engine_with_seed(5).fit_and_predict(&s, 7).unwrap();

    assert_eq!(
        forecast.warnings,
        vec![ForecastWarning::InsufficientHistory {
            observed_days: 89,
            recommended_days: 730,
        }]
    );
    assert!(!forecast.summary.yearly_seasonality);
}

#[test]
fn test_zero_horizon_covers_history_only() {
    let s = series("WAVE", "2021-01-01", &wavy_closes(50));
    let forecast = engine_with_seed(5).fit_and_predict(&s, 0).unwrap();

    assert_eq!(forecast.rows.len(), 50);
    assert!(forecast.future_rows().is_empty());
    assert!(forecast.accuracy.mape >= 0.0);
}

#[rstest]
#[case(-1)]
#[case(MAX_HORIZON_DAYS + 1)]
fn test_out_of_range_horizon_rejected(#[case] horizon: i64) {
    let s = series("WAVE", "2021-01-01", &wavy_closes(50));
    let err = engine_with_seed(5).fit_and_predict(&s, horizon).unwrap_err();

    assert!(matches!(err, ForecastError::InvalidInput(_)));
}
