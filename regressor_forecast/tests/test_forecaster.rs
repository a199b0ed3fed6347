mod common;

use common::{business_days, date, is_weekend, linear_history, EchoModel, FailingModel};
use pretty_assertions::assert_eq;
use regressor_forecast::{
    AdditiveModel, FeatureRow, FeatureTable, ForecastError, Indicator, IndicatorSet,
    IterativeForecaster, StepPolicy,
};
use rstest::rstest;

fn fitted_echo(
    history: &FeatureTable,
    policy: StepPolicy,
) -> (EchoModel, IterativeForecaster<EchoModel>) {
    let model = EchoModel::with_offset(0.5);
    let mut forecaster = IterativeForecaster::new(model.clone(), policy);
    forecaster.fit(history).unwrap();
    (model, forecaster)
}

#[test]
fn test_predict_before_fit_is_not_fitted() {
    let forecaster = IterativeForecaster::new(EchoModel::default(), StepPolicy::BusinessDay);

    assert!(!forecaster.is_fitted());
    assert!(matches!(forecaster.predict(3), Err(ForecastError::NotFitted)));
    assert!(matches!(forecaster.predict(0), Err(ForecastError::NotFitted)));
    assert!(matches!(
        forecaster.forecast_table(1),
        Err(ForecastError::NotFitted)
    ));
}

#[test]
fn test_predict_zero_skips_model() {
    let (model, forecaster) = fitted_echo(&linear_history(60), StepPolicy::BusinessDay);

    let forecast = forecaster.predict(0).unwrap();

    assert!(forecast.is_empty());
    assert_eq!(model.fit_count(), 1);
    assert_eq!(model.predict_count(), 0);
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(12)]
fn test_predict_business_days(#[case] periods: usize) {
    let history = linear_history(60);
    let (model, forecaster) = fitted_echo(&history, StepPolicy::BusinessDay);

    let forecast = forecaster.predict(periods).unwrap();

    assert_eq!(forecast.len(), periods);
    let expected = StepPolicy::BusinessDay.future_dates(history.last_date().unwrap(), periods);
    let dates: Vec<_> = forecast.iter().map(|point| point.date).collect();
    assert_eq!(dates, expected);
    assert!(dates.iter().all(|d| !is_weekend(*d)));
    assert!(dates.windows(2).all(|w| w[0] < w[1]));

    for point in &forecast {
        assert!(point.lower <= point.yhat && point.yhat <= point.upper);
    }

    // One model pass per step plus the final pass over the extended table
    assert_eq!(model.predict_count(), periods + 1);
}

#[rstest]
#[case(1)]
#[case(7)]
fn test_predict_calendar_days(#[case] periods: usize) {
    let history = linear_history(60);
    let (_, forecaster) = fitted_echo(&history, StepPolicy::CalendarDay);

    let forecast = forecaster.predict(periods).unwrap();
    let last = history.last_date().unwrap();

    assert_eq!(forecast.len(), periods);
    for (i, point) in forecast.iter().enumerate() {
        assert_eq!(point.date, last + chrono::Duration::days(i as i64 + 1));
    }
}

#[test]
fn test_sixty_linear_business_days() {
    let history = linear_history(60);
    assert_eq!(history.last_date(), Some(date(2024, 3, 22)));
    assert_eq!(history.indicators().max_lookback(), 50);

    let mut forecaster =
        IterativeForecaster::new(AdditiveModel::default(), StepPolicy::BusinessDay);
    forecaster.fit(&history).unwrap();
    let forecast = forecaster.predict(3).unwrap();

    let dates: Vec<_> = forecast.iter().map(|point| point.date).collect();
    assert_eq!(dates, vec![date(2024, 3, 25), date(2024, 3, 26), date(2024, 3, 27)]);
    for point in &forecast {
        assert!(point.lower <= point.yhat && point.yhat <= point.upper);
        assert!(point.yhat > 120.0 && point.yhat < 140.0);
    }
}

#[test]
fn test_refit_gives_same_forecast() {
    let history = linear_history(80);

    let mut first = IterativeForecaster::new(AdditiveModel::default(), StepPolicy::BusinessDay);
    first.fit(&history).unwrap();
    let a = first.predict(5).unwrap();
    drop(first);

    let mut second = IterativeForecaster::new(AdditiveModel::default(), StepPolicy::BusinessDay);
    second.fit(&history).unwrap();
    let b = second.predict(5).unwrap();

    let dates_a: Vec<_> = a.iter().map(|point| point.date).collect();
    let dates_b: Vec<_> = b.iter().map(|point| point.date).collect();
    assert_eq!(dates_a, dates_b);
    // The additive model is deterministic
    assert_eq!(a, b);

    // predict does not mutate the fitted state
    assert_eq!(second.predict(5).unwrap(), b);
}

#[test]
fn test_history_length_boundary() {
    let window = IndicatorSet::standard().max_lookback();

    let mut forecaster = IterativeForecaster::new(EchoModel::default(), StepPolicy::BusinessDay);
    assert!(forecaster.fit(&linear_history(window)).is_ok());
    assert!(forecaster.is_fitted());

    let result = forecaster.fit(&linear_history(window - 1));
    assert!(matches!(
        result,
        Err(ForecastError::InsufficientData {
            required: 50,
            available: 49
        })
    ));
    assert!(!forecaster.is_fitted());
}

#[test]
fn test_incomplete_rows_are_not_trained_on() {
    let (model, _) = fitted_echo(&linear_history(60), StepPolicy::BusinessDay);
    // 60 rows minus the 49 warm-up rows of the 50-day moving average
    assert_eq!(model.trained_on(), 11);
}

#[test]
fn test_missing_target_is_rejected() {
    let indicators = IndicatorSet::new(vec![Indicator::Sma { window: 1 }]).unwrap();
    let rows = vec![
        FeatureRow {
            date: date(2024, 1, 1),
            target: Some(1.0),
            features: vec![Some(1.0)],
        },
        FeatureRow {
            date: date(2024, 1, 2),
            target: None,
            features: vec![Some(1.0)],
        },
    ];
    let history = FeatureTable::new(indicators, rows).unwrap();

    let mut forecaster = IterativeForecaster::new(EchoModel::default(), StepPolicy::BusinessDay);
    assert!(matches!(
        forecaster.fit(&history),
        Err(ForecastError::DataError(_))
    ));
}

#[test]
fn test_no_complete_rows_is_insufficient() {
    let indicators = IndicatorSet::new(vec![Indicator::Sma { window: 1 }]).unwrap();
    let rows = vec![FeatureRow {
        date: date(2024, 1, 1),
        target: Some(1.0),
        features: vec![None],
    }];
    let history = FeatureTable::new(indicators, rows).unwrap();

    let mut forecaster = IterativeForecaster::new(EchoModel::default(), StepPolicy::BusinessDay);
    assert!(matches!(
        forecaster.fit(&history),
        Err(ForecastError::InsufficientData { available: 0, .. })
    ));
}

#[test]
fn test_predictions_feed_back_into_indicators() {
    // MA1 is the close itself, so each committed close lifts the next regressor.
    // The final pass sees the recomputed MA1 of every future row (4, 5, 6).
    let indicators = IndicatorSet::new(vec![Indicator::Sma { window: 1 }]).unwrap();
    let dates = business_days(date(2024, 1, 1), 3);
    let history = FeatureTable::from_closes(&dates, &[1.0, 2.0, 3.0], indicators).unwrap();

    let mut forecaster =
        IterativeForecaster::new(EchoModel::with_offset(1.0), StepPolicy::BusinessDay);
    forecaster.fit(&history).unwrap();

    let yhat: Vec<f64> = forecaster
        .predict(3)
        .unwrap()
        .iter()
        .map(|point| point.yhat)
        .collect();
    assert_eq!(yhat, vec![5.0, 6.0, 7.0]);
}

#[test]
fn test_placeholders_carry_forward_last_values() {
    // Step 1 predicts from the carried MA2 (3.0) and commits 3.0; the recomputed
    // MA2 of that row is (4 + 3) / 2. Step 2 carries 3.5 and commits 3.5, whose
    // recomputed MA2 is (3 + 3.5) / 2.
    let indicators = IndicatorSet::new(vec![Indicator::Sma { window: 2 }]).unwrap();
    let dates = business_days(date(2024, 1, 1), 2);
    let history = FeatureTable::from_closes(&dates, &[2.0, 4.0], indicators).unwrap();

    let mut forecaster =
        IterativeForecaster::new(EchoModel::with_offset(0.0), StepPolicy::BusinessDay);
    forecaster.fit(&history).unwrap();

    let table = forecaster.forecast_table(2).unwrap();
    let yhat: Vec<f64> = table.future().iter().map(|row| row.yhat).collect();
    assert_eq!(yhat, vec![3.5, 3.25]);

    assert_eq!(table.history().len(), 1);
    assert_eq!(table.history()[0].actual, Some(4.0));
    assert!(table.future().iter().all(|row| row.actual.is_none()));
}

#[test]
fn test_model_errors_propagate() {
    let history = linear_history(60);

    let mut forecaster =
        IterativeForecaster::new(FailingModel { fail_fit: true }, StepPolicy::BusinessDay);
    assert!(matches!(
        forecaster.fit(&history),
        Err(ForecastError::ModelError(_))
    ));
    assert!(!forecaster.is_fitted());

    let mut forecaster =
        IterativeForecaster::new(FailingModel { fail_fit: false }, StepPolicy::BusinessDay);
    forecaster.fit(&history).unwrap();
    assert!(forecaster.predict(0).unwrap().is_empty());
    assert!(matches!(
        forecaster.predict(2),
        Err(ForecastError::ModelError(_))
    ));
}

#[test]
fn test_history_is_left_untouched() {
    let history = linear_history(60);
    let snapshot = history.clone();
    let (_, forecaster) = fitted_echo(&history, StepPolicy::BusinessDay);

    forecaster.predict(4).unwrap();
    assert_eq!(history, snapshot);
    assert_eq!(forecaster.model_name(), "echo");
    assert_eq!(forecaster.policy(), StepPolicy::BusinessDay);
}
