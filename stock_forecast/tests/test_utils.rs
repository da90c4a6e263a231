use chrono::NaiveDate;
use rstest::rstest;
use stock_forecast::utils::{calendar_days, date_parser, forecast_accuracy};

#[rstest]
#[case("2024-02-29")]
#[case("02/29/2024")]
#[case("2024/02/29")]
#[case("2024-02-29 16:00:00")]
#[case("2024-02-29T16:00:00")]
#[case("2024-02-29T09:30:00-05:00")]
#[case("  2024-02-29 ")]
fn test_parse_date_formats(#[case] raw: &str) {
    assert_eq!(
        date_parser::parse_date(raw).unwrap(),
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    );
}

#[test]
fn test_parse_date_rejects_garbage() {
    assert!(date_parser::parse_date("next tuesday").is_err());
    assert!(date_parser::parse_date("2023-02-29").is_err());
}

#[test]
fn test_calendar_days_inclusive() {
    let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    let days = calendar_days(start, end);

    assert_eq!(days.len(), 5);
    assert_eq!(days.first(), Some(&start));
    assert_eq!(days.last(), Some(&end));
    assert!(calendar_days(end, start).is_empty());
}

#[test]
fn test_forecast_accuracy() {
    let actual = vec![100.0, 102.0, 104.0, 103.0];
    let forecast = vec![101.0, 101.0, 105.0, 103.0];

    let accuracy = forecast_accuracy(&forecast, &actual).unwrap();
    assert!((accuracy.mae - 0.75).abs() < 1e-12);
    assert!((accuracy.mse - 0.75).abs() < 1e-12);
    assert!((accuracy.rmse - 0.75_f64.sqrt()).abs() < 1e-12);
    assert!(accuracy.mape > 0.0 && accuracy.smape > 0.0);

    assert!(forecast_accuracy(&[1.0], &[1.0, 2.0]).is_err());
    assert!(forecast_accuracy(&[], &[]).is_err());
}

#[test]
fn test_percentage_errors_skip_zero_actuals() {
    let accuracy = forecast_accuracy(&[1.0, 110.0, 50.0], &[0.0, 100.0, 50.0]).unwrap();
    // 10% and 0% over the two non-zero closes
    assert!((accuracy.mape - 5.0).abs() < 1e-12);
    assert!((accuracy.smape - (200.0 + 2000.0 / 210.0) / 3.0).abs() < 1e-12);

    let zeros = forecast_accuracy(&[0.0, 2.0], &[0.0, 0.0]).unwrap();
    assert_eq!(zeros.mape, 0.0);
    assert!((zeros.smape - 100.0).abs() < 1e-12);
}
