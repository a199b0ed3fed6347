//! Regression models that predict a target from a date plus named regressors

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use std::fmt::Debug;

/// Training observation: date, known target and regressor values
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub date: NaiveDate,
    pub target: f64,
    pub regressors: Vec<f64>,
}

/// Inference request: date and regressor values
#[derive(Debug, Clone, PartialEq)]
pub struct RegressorRow {
    pub date: NaiveDate,
    pub regressors: Vec<f64>,
}

/// Point forecast with its uncertainty interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Point estimate
    pub yhat: f64,
    /// Lower bound of the interval
    pub lower: f64,
    /// Upper bound of the interval
    pub upper: f64,
}

impl Estimate {
    /// Create an estimate, checking `lower <= yhat <= upper`
    pub fn new(yhat: f64, lower: f64, upper: f64) -> Result<Self> {
        if !(lower <= yhat && yhat <= upper) {
            return Err(ForecastError::ModelError(format!(
                "Interval [{}, {}] does not contain estimate {}",
                lower, upper, yhat
            )));
        }

        Ok(Self { yhat, lower, upper })
    }

    /// Interval width
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Trained regression model
pub trait FittedRegressorModel: Debug {
    /// Predict one estimate per row, in the same order
    fn predict(&self, rows: &[RegressorRow]) -> Result<Vec<Estimate>>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Regression model that can be trained on dated rows
pub trait RegressorModel: Debug + Clone {
    /// The type of trained model produced
    type Fitted: FittedRegressorModel;

    /// Train the model
    fn fit(&self, rows: &[TrainingRow]) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod additive;
mod linalg;

pub use additive::{AdditiveConfig, AdditiveModel, FittedAdditiveModel, Seasonality};
