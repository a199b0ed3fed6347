//! Forecast accuracy metrics and hold-out evaluation

use crate::calendar::StepPolicy;
use crate::data::FeatureTable;
use crate::error::{ForecastError, Result};
use crate::forecaster::{ForecastPoint, IterativeForecaster};
use crate::models::RegressorModel;
use serde::Serialize;
use std::fmt;

/// Forecast accuracy metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model Performance Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.2}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.2}%", self.smape)?;
        Ok(())
    }
}

/// Calculate accuracy metrics for a forecast vs actual values
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::ValidationError(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;

    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual.iter())
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    // Zero actuals are skipped but still count in the denominator.
    let mape = actual
        .iter()
        .zip(errors.iter())
        .filter(|(&a, _)| a != 0.0)
        .map(|(&a, &e)| (e.abs() / a.abs()) * 100.0)
        .sum::<f64>()
        / n;

    let smape = actual
        .iter()
        .zip(forecast.iter())
        .map(|(&a, &f)| {
            let denominator = a.abs() + f.abs();
            if denominator == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / denominator
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse,
        mape,
        smape,
    })
}

/// Result of scoring a forecast against held-out history
#[derive(Debug, Clone, PartialEq)]
pub struct HoldoutReport {
    /// Forecast for the held-out rows
    pub forecast: Vec<ForecastPoint>,
    /// Observed closes of the held-out rows
    pub actual: Vec<f64>,
    pub accuracy: ForecastAccuracy,
}

/// Fit on all but the last `test_len` rows, forecast `test_len` steps and score them
///
/// Forecasts and held-out closes are matched by position, so holidays in the
/// held-out range shift the forecast dates but not the comparison.
pub fn holdout_evaluation<M: RegressorModel>(
    model: M,
    policy: StepPolicy,
    history: &FeatureTable,
    test_len: usize,
) -> Result<HoldoutReport> {
    if test_len == 0 || test_len >= history.len() {
        return Err(ForecastError::ValidationError(format!(
            "Hold-out length must be between 1 and {}, got {}",
            history.len().saturating_sub(1),
            test_len
        )));
    }

    let split = history.len() - test_len;
    let train = FeatureTable::new(
        history.indicators().clone(),
        history.rows()[..split].to_vec(),
    )?;
    let actual: Vec<f64> = history.targets()?[split..].to_vec();

    let mut forecaster = IterativeForecaster::new(model, policy);
    forecaster.fit(&train)?;
    let forecast = forecaster.predict(test_len)?;

    let predicted: Vec<f64> = forecast.iter().map(|point| point.yhat).collect();
    let accuracy = forecast_accuracy(&predicted, &actual)?;

    Ok(HoldoutReport {
        forecast,
        actual,
        accuracy,
    })
}
