#![allow(dead_code)]

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regressor_forecast::{
    Estimate, FeatureTable, FittedRegressorModel, ForecastError, IndicatorSet, RegressorModel,
    RegressorRow, Result, TrainingRow,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// `n` consecutive business days starting at `start` (or the next weekday)
pub fn business_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(n);
    let mut current = start;
    while dates.len() < n {
        if !is_weekend(current) {
            dates.push(current);
        }
        current += Duration::days(1);
    }
    dates
}

/// Business-day history of `100.0 + 0.5 * i` closes with the standard indicators
pub fn linear_history(n: usize) -> FeatureTable {
    let dates = business_days(date(2024, 1, 1), n);
    let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 0.5).collect();
    FeatureTable::from_closes(&dates, &closes, IndicatorSet::standard()).unwrap()
}

/// Model predicting `first regressor + offset` with a ±1 interval, counting its calls
#[derive(Debug, Clone, Default)]
pub struct EchoModel {
    pub offset: f64,
    pub fit_calls: Arc<AtomicUsize>,
    pub predict_calls: Arc<AtomicUsize>,
    pub training_rows: Arc<AtomicUsize>,
}

impl EchoModel {
    pub fn with_offset(offset: f64) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    pub fn fit_count(&self) -> usize {
        self.fit_calls.load(Ordering::SeqCst)
    }

    pub fn predict_count(&self) -> usize {
        self.predict_calls.load(Ordering::SeqCst)
    }

    pub fn trained_on(&self) -> usize {
        self.training_rows.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct FittedEcho {
    offset: f64,
    predict_calls: Arc<AtomicUsize>,
}

impl RegressorModel for EchoModel {
    type Fitted = FittedEcho;

    fn fit(&self, rows: &[TrainingRow]) -> Result<Self::Fitted> {
        self.fit_calls.fetch_add(1, Ordering::SeqCst);
        self.training_rows.store(rows.len(), Ordering::SeqCst);
        Ok(FittedEcho {
            offset: self.offset,
            predict_calls: Arc::clone(&self.predict_calls),
        })
    }

    fn name(&self) -> &str {
        "echo"
    }
}

impl FittedRegressorModel for FittedEcho {
    fn predict(&self, rows: &[RegressorRow]) -> Result<Vec<Estimate>> {
        self.predict_calls.fetch_add(1, Ordering::SeqCst);
        rows.iter()
            .map(|row| {
                let yhat = row.regressors[0] + self.offset;
                Estimate::new(yhat, yhat - 1.0, yhat + 1.0)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "echo"
    }
}

/// Model whose fit or predict always fails
#[derive(Debug, Clone)]
pub struct FailingModel {
    pub fail_fit: bool,
}

#[derive(Debug)]
pub struct FittedFailing;

impl RegressorModel for FailingModel {
    type Fitted = FittedFailing;

    fn fit(&self, _rows: &[TrainingRow]) -> Result<Self::Fitted> {
        if self.fail_fit {
            Err(ForecastError::ModelError("did not converge".to_string()))
        } else {
            Ok(FittedFailing)
        }
    }

    fn name(&self) -> &str {
        "failing"
    }
}

impl FittedRegressorModel for FittedFailing {
    fn predict(&self, _rows: &[RegressorRow]) -> Result<Vec<Estimate>> {
        Err(ForecastError::ModelError("singular regressors".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}
