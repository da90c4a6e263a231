mod common;

use common::{series, wavy_closes};
use pretty_assertions::assert_eq;
use rstest::rstest;
use stock_forecast::indicators::{latest_complete, SNAPSHOT_ROWS};
use stock_forecast::IndicatorEngine;

#[rstest]
#[case::wavy(wavy_closes(200))]
#[case::rising((0..80).map(|i| 10.0 + i as f64).collect())]
#[case::falling((0..80).map(|i| 200.0 - i as f64).collect())]
#[case::flat(vec![42.0; 40])]
fn test_rsi_stays_in_bounds(#[case] closes: Vec<f64>) {
    let rows = IndicatorEngine::new()
        .compute(&series("TEST", "2023-01-01", &closes))
        .unwrap();

    for rsi in rows.iter().filter_map(|r| r.rsi_14) {
        assert!((0.0..=100.0).contains(&rsi), "RSI out of range: {}", rsi);
    }
}

#[test]
fn test_rsi_edge_conventions() {
    let rising: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
    let rows = IndicatorEngine::new()
        .compute(&series("UP", "2023-01-01", &rising))
        .unwrap();
    assert_eq!(rows.last().unwrap().rsi_14, Some(100.0));

    let rows = IndicatorEngine::new()
        .compute(&series("FLAT", "2023-01-01", &[5.0; 30]))
        .unwrap();
    assert_eq!(rows.last().unwrap().rsi_14, Some(50.0));
}

#[test]
fn test_compute_is_idempotent() {
    let s = series("TEST", "2022-03-01", &wavy_closes(150));
    let engine = IndicatorEngine::new();

    assert_eq!(engine.compute(&s).unwrap(), engine.compute(&s).unwrap());
}

#[test]
fn test_snapshot_exposes_only_complete_rows() {
    let s = series("TEST", "2022-03-01", &wavy_closes(150));
    let rows = IndicatorEngine::new().compute(&s).unwrap();

    let complete = rows.iter().filter(|r| r.is_complete()).count();
    assert_eq!(complete, 150 - 19);

    let snapshot = latest_complete(&rows, SNAPSHOT_ROWS);
    assert_eq!(snapshot.len(), SNAPSHOT_ROWS);
    assert_eq!(snapshot.first().unwrap().date, rows[150 - SNAPSHOT_ROWS].date);
}

#[test]
fn test_ema_tracks_constant_series() {
    let rows = IndicatorEngine::new()
        .compute(&series("TEST", "2023-01-01", &[7.5; 25]))
        .unwrap();

    for row in rows {
        assert!((row.ema_20 - 7.5).abs() < 1e-12);
    }
}
