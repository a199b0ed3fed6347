//! Multi-step forecasting with regressors derived from the forecast itself
//!
//! The indicators used as regressors are functions of the close series, so
//! their future values are unknown until the closes before them have been
//! predicted. The forecaster therefore extends the feature table one step at
//! a time:
//!
//! 1. the new date gets the most recent indicator values as placeholders,
//! 2. the model predicts that date and the prediction becomes its close,
//! 3. every indicator is recomputed over the extended close series, which
//!    feeds the placeholders of the next step.
//!
//! A final model pass over the whole extended table produces the returned
//! estimates and intervals.

use crate::calendar::StepPolicy;
use crate::config::ForecasterConfig;
use crate::data::{date_series, FeatureRow, FeatureTable};
use crate::error::{ForecastError, Result};
use crate::indicators::IndicatorSet;
use crate::models::{Estimate, FittedRegressorModel, RegressorModel, RegressorRow, TrainingRow};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// Forecast for one future date
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    /// Point estimate
    pub yhat: f64,
    /// Lower bound of the uncertainty interval
    pub lower: f64,
    /// Upper bound of the uncertainty interval
    pub upper: f64,
}

/// Model output for one row of the extended table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    /// Observed close, `None` for forecast dates
    pub actual: Option<f64>,
    pub yhat: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ForecastRow {
    fn new(date: NaiveDate, actual: Option<f64>, estimate: Estimate) -> Self {
        Self {
            date,
            actual,
            yhat: estimate.yhat,
            lower: estimate.lower,
            upper: estimate.upper,
        }
    }
}

/// In-sample fit and out-of-sample forecast over the extended table
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastTable {
    rows: Vec<ForecastRow>,
    future_start: usize,
}

impl ForecastTable {
    /// Every row, history first
    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    /// Rows covering the observed history
    pub fn history(&self) -> &[ForecastRow] {
        &self.rows[..self.future_start]
    }

    /// Rows covering the forecast dates
    pub fn future(&self) -> &[ForecastRow] {
        &self.rows[self.future_start..]
    }

    /// Forecast dates as points
    pub fn points(&self) -> Vec<ForecastPoint> {
        self.future()
            .iter()
            .map(|row| ForecastPoint {
                date: row.date,
                yhat: row.yhat,
                lower: row.lower,
                upper: row.upper,
            })
            .collect()
    }

    /// Export as a polars DataFrame with columns `ds`, `y`, `yhat`, `yhat_lower`, `yhat_upper`
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let actual: Vec<Option<f64>> = self.rows.iter().map(|row| row.actual).collect();
        let yhat: Vec<f64> = self.rows.iter().map(|row| row.yhat).collect();
        let lower: Vec<f64> = self.rows.iter().map(|row| row.lower).collect();
        let upper: Vec<f64> = self.rows.iter().map(|row| row.upper).collect();

        Ok(DataFrame::new(vec![
            date_series("ds", self.rows.iter().map(|row| row.date))?,
            Series::new("y", actual),
            Series::new("yhat", yhat),
            Series::new("yhat_lower", lower),
            Series::new("yhat_upper", upper),
        ])?)
    }
}

#[derive(Debug)]
struct FittedState<F> {
    fitted: F,
    history: FeatureTable,
}

/// Forecaster that feeds its own predictions back into the regressors
#[derive(Debug)]
pub struct IterativeForecaster<M: RegressorModel> {
    model: M,
    policy: StepPolicy,
    indicators: Option<IndicatorSet>,
    state: Option<FittedState<M::Fitted>>,
}

impl<M: RegressorModel> IterativeForecaster<M> {
    /// Create an unfitted forecaster accepting any indicator columns
    pub fn new(model: M, policy: StepPolicy) -> Self {
        Self {
            model,
            policy,
            indicators: None,
            state: None,
        }
    }

    /// Create an unfitted forecaster stepping as `config` describes
    ///
    /// `fit` then only accepts histories carrying exactly the configured
    /// indicator columns.
    pub fn from_config(model: M, config: &ForecasterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            indicators: Some(config.indicators.clone()),
            ..Self::new(model, config.step_policy())
        })
    }

    /// Indicator columns required of the history, if any
    pub fn indicators(&self) -> Option<&IndicatorSet> {
        self.indicators.as_ref()
    }

    /// Date stepping used for future rows
    pub fn policy(&self) -> StepPolicy {
        self.policy
    }

    /// Name of the underlying model
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Whether `fit` has succeeded
    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Train the model on the rows of `history` whose indicators are complete
    ///
    /// Fails with [`ForecastError::InsufficientData`] when the history is
    /// shorter than the largest indicator look-back or no complete row
    /// remains, and with [`ForecastError::InvalidParameter`] when the history
    /// columns differ from the configured indicators. A failed fit leaves the
    /// forecaster unfitted.
    pub fn fit(&mut self, history: &FeatureTable) -> Result<()> {
        self.state = None;

        if let Some(expected) = &self.indicators {
            if history.indicators() != expected {
                return Err(ForecastError::InvalidParameter(format!(
                    "History indicators [{}] differ from configured [{}]",
                    history.indicators().names().join(", "),
                    expected.names().join(", ")
                )));
            }
        }

        let required = history.indicators().max_lookback();
        if history.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                available: history.len(),
            });
        }

        // Every close is needed later to recompute indicators.
        history.targets()?;

        let training: Vec<TrainingRow> = history
            .rows()
            .iter()
            .filter_map(|row| {
                Some(TrainingRow {
                    date: row.date,
                    target: row.target?,
                    regressors: row.complete_features()?,
                })
            })
            .collect();

        if training.is_empty() {
            return Err(ForecastError::InsufficientData {
                required,
                available: 0,
            });
        }

        info!(
            model = self.model.name(),
            history_rows = history.len(),
            training_rows = training.len(),
            "fitting forecaster"
        );

        let fitted = self.model.fit(&training)?;
        self.state = Some(FittedState {
            fitted,
            history: history.clone(),
        });

        Ok(())
    }

    /// Forecast the `periods` dates following the last historical date
    ///
    /// Returns an empty vector for `periods == 0` without running the model.
    pub fn predict(&self, periods: usize) -> Result<Vec<ForecastPoint>> {
        let state = self.state.as_ref().ok_or(ForecastError::NotFitted)?;
        if periods == 0 {
            return Ok(Vec::new());
        }

        Ok(self.extend(state, periods)?.points())
    }

    /// Model output for the complete history rows and `periods` future dates
    pub fn forecast_table(&self, periods: usize) -> Result<ForecastTable> {
        let state = self.state.as_ref().ok_or(ForecastError::NotFitted)?;
        self.extend(state, periods)
    }

    fn extend(&self, state: &FittedState<M::Fitted>, periods: usize) -> Result<ForecastTable> {
        let mut working = state.history.clone();
        let history_end = working
            .last_date()
            .ok_or_else(|| ForecastError::DataError("Fitted history is empty".to_string()))?;

        for step in 0..periods {
            let last_date = working
                .last_date()
                .ok_or_else(|| ForecastError::DataError("Working table is empty".to_string()))?;
            let next_date = self.policy.next_date(last_date);

            // Placeholders are carried forward, not recomputed, before the model runs.
            let placeholder = last_known_features(&working)?;
            working.push(FeatureRow {
                date: next_date,
                target: None,
                features: placeholder,
            })?;

            let estimates = state.fitted.predict(&regressor_rows(&working))?;
            let estimate = estimates.last().ok_or_else(|| {
                ForecastError::ModelError("Model returned no estimates".to_string())
            })?;

            working.commit_last_target(estimate.yhat)?;
            working.recompute_indicators()?;

            debug!(step, date = %next_date, yhat = estimate.yhat, "committed forecast step");
        }

        let inputs = regressor_rows(&working);
        let estimates = state.fitted.predict(&inputs)?;
        if estimates.len() != inputs.len() {
            return Err(ForecastError::ModelError(format!(
                "Model returned {} estimates for {} rows",
                estimates.len(),
                inputs.len()
            )));
        }

        let targets: Vec<(NaiveDate, Option<f64>)> = working
            .complete_rows()
            .map(|row| (row.date, row.target))
            .collect();
        let rows: Vec<ForecastRow> = targets
            .into_iter()
            .zip(estimates)
            .map(|((date, target), estimate)| {
                let actual = if date <= history_end { target } else { None };
                ForecastRow::new(date, actual, estimate)
            })
            .collect();

        let future_start = rows.partition_point(|row| row.date <= history_end);
        if rows.len() - future_start != periods {
            return Err(ForecastError::DataError(format!(
                "Extended table holds {} complete future rows, expected {}",
                rows.len() - future_start,
                periods
            )));
        }

        info!(periods, rows = rows.len(), "forecast complete");

        Ok(ForecastTable { rows, future_start })
    }
}

/// Most recent value of every indicator column
fn last_known_features(table: &FeatureTable) -> Result<Vec<Option<f64>>> {
    (0..table.indicators().len())
        .map(|column| {
            table
                .rows()
                .iter()
                .rev()
                .find_map(|row| row.features[column])
                .map(Some)
                .ok_or_else(|| {
                    ForecastError::DataError(format!(
                        "No known value for indicator {}",
                        table.indicators().indicators()[column]
                    ))
                })
        })
        .collect()
}

/// Model inputs for the rows with complete indicators
fn regressor_rows(table: &FeatureTable) -> Vec<RegressorRow> {
    table
        .complete_rows()
        .filter_map(|row| {
            Some(RegressorRow {
                date: row.date,
                regressors: row.complete_features()?,
            })
        })
        .collect()
}
