//! Additive trend + seasonality model with extra regressors
//!
//! The fitted value for a date is
//!
//! ```text
//! y(t) = intercept + slope * t + weekly(t) + yearly(t) + Σ beta_i * z_i
//! ```
//!
//! where `t` is time scaled to `[0, 1]` over the training span, the seasonal
//! terms are Fourier series and `z_i` are the standardised regressors. The
//! coefficients are estimated by penalised least squares on the target scaled
//! by its absolute maximum. Intervals are symmetric around the point estimate
//! and widen with the number of steps beyond the training data.

use crate::error::{ForecastError, Result};
use crate::models::linalg::penalised_least_squares;
use crate::models::{Estimate, FittedRegressorModel, RegressorModel, RegressorRow, TrainingRow};
use chrono::{Datelike, NaiveDate};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;
use tracing::{debug, warn};

const WEEK_DAYS: f64 = 7.0;
const YEAR_DAYS: f64 = 365.25;
const WEEKLY_AUTO_SPAN_DAYS: i64 = 14;
const YEARLY_AUTO_SPAN_DAYS: i64 = 730;
const TREND_PENALTY: f64 = 1e-9;
const MIN_STD: f64 = 1e-12;

/// Whether a seasonal component is included
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seasonality {
    /// Included when the training span is long enough
    #[default]
    Auto,
    Enabled,
    Disabled,
}

impl Seasonality {
    fn resolve(self, span_days: i64, auto_threshold: i64) -> bool {
        match self {
            Seasonality::Auto => span_days >= auto_threshold,
            Seasonality::Enabled => true,
            Seasonality::Disabled => false,
        }
    }
}

/// Parameters of the additive model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditiveConfig {
    /// Coverage of the uncertainty interval, in (0, 1)
    pub interval_width: f64,
    pub weekly_seasonality: Seasonality,
    pub yearly_seasonality: Seasonality,
    pub weekly_fourier_order: usize,
    pub yearly_fourier_order: usize,
    /// Prior scale of the seasonal coefficients; smaller means stronger shrinkage
    pub seasonality_prior_scale: f64,
    /// Prior scale of the regressor coefficients
    pub regressor_prior_scale: f64,
    /// Growth of the interval variance per step beyond the training data
    pub trend_uncertainty: f64,
}

impl Default for AdditiveConfig {
    fn default() -> Self {
        Self {
            interval_width: 0.80,
            weekly_seasonality: Seasonality::Auto,
            yearly_seasonality: Seasonality::Auto,
            weekly_fourier_order: 3,
            yearly_fourier_order: 10,
            seasonality_prior_scale: 10.0,
            regressor_prior_scale: 10.0,
            trend_uncertainty: 0.05,
        }
    }
}

impl AdditiveConfig {
    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "Interval width must be between 0 and 1".to_string(),
            ));
        }

        if !(self.seasonality_prior_scale > 0.0 && self.seasonality_prior_scale.is_finite())
            || !(self.regressor_prior_scale > 0.0 && self.regressor_prior_scale.is_finite())
        {
            return Err(ForecastError::InvalidParameter(
                "Prior scales must be positive and finite".to_string(),
            ));
        }

        if !(self.trend_uncertainty >= 0.0 && self.trend_uncertainty.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "Trend uncertainty must be non-negative".to_string(),
            ));
        }

        Ok(())
    }
}

/// Untrained additive model
#[derive(Debug, Clone)]
pub struct AdditiveModel {
    name: String,
    config: AdditiveConfig,
}

impl AdditiveModel {
    /// Create a model with validated parameters
    pub fn new(config: AdditiveConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: format!(
                "Additive regression (interval={:.0}%)",
                config.interval_width * 100.0
            ),
            config,
        })
    }

    /// Model parameters
    pub fn config(&self) -> &AdditiveConfig {
        &self.config
    }
}

impl Default for AdditiveModel {
    fn default() -> Self {
        Self {
            name: "Additive regression (interval=80%)".to_string(),
            config: AdditiveConfig::default(),
        }
    }
}

/// Trained additive model
#[derive(Debug, Clone)]
pub struct FittedAdditiveModel {
    name: String,
    start: NaiveDate,
    last_date: NaiveDate,
    span_days: f64,
    step_days: f64,
    y_scale: f64,
    weekly_order: usize,
    yearly_order: usize,
    regressor_stats: Vec<(f64, f64)>,
    coefficients: Array1<f64>,
    sigma: f64,
    z_score: f64,
    trend_uncertainty: f64,
}

impl RegressorModel for AdditiveModel {
    type Fitted = FittedAdditiveModel;

    fn fit(&self, rows: &[TrainingRow]) -> Result<Self::Fitted> {
        let first = rows.first().ok_or(ForecastError::InsufficientData {
            required: 1,
            available: 0,
        })?;
        let regressor_count = first.regressors.len();

        for row in rows {
            if row.regressors.len() != regressor_count {
                return Err(ForecastError::InvalidParameter(format!(
                    "Row {} has {} regressors, expected {}",
                    row.date,
                    row.regressors.len(),
                    regressor_count
                )));
            }
            if !row.target.is_finite() || row.regressors.iter().any(|v| !v.is_finite()) {
                return Err(ForecastError::ModelError(format!(
                    "Non-finite training value on {}",
                    row.date
                )));
            }
        }

        let start = rows.iter().map(|row| row.date).min().unwrap_or(first.date);
        let last_date = rows.iter().map(|row| row.date).max().unwrap_or(first.date);
        let span = (last_date - start).num_days();
        let span_days = span.max(1) as f64;
        let step_days = if rows.len() > 1 && span > 0 {
            span as f64 / (rows.len() - 1) as f64
        } else {
            1.0
        };

        let weekly_order = if self
            .config
            .weekly_seasonality
            .resolve(span, WEEKLY_AUTO_SPAN_DAYS)
        {
            self.config.weekly_fourier_order
        } else {
            0
        };
        let yearly_order = if self
            .config
            .yearly_seasonality
            .resolve(span, YEARLY_AUTO_SPAN_DAYS)
        {
            self.config.yearly_fourier_order
        } else {
            0
        };

        let y_scale = rows
            .iter()
            .map(|row| row.target.abs())
            .fold(0.0, f64::max);
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };

        let n = rows.len() as f64;
        let regressor_stats: Vec<(f64, f64)> = (0..regressor_count)
            .map(|i| {
                let mean = rows.iter().map(|row| row.regressors[i]).sum::<f64>() / n;
                let variance = rows
                    .iter()
                    .map(|row| (row.regressors[i] - mean).powi(2))
                    .sum::<f64>()
                    / n;
                let std = variance.sqrt();
                if std < MIN_STD {
                    warn!(regressor = i, "constant regressor carries no information");
                    (mean, 1.0)
                } else {
                    (mean, std)
                }
            })
            .collect();

        let mut fitted = FittedAdditiveModel {
            name: self.name.clone(),
            start,
            last_date,
            span_days,
            step_days,
            y_scale,
            weekly_order,
            yearly_order,
            regressor_stats,
            coefficients: Array1::zeros(0),
            sigma: 0.0,
            z_score: standard_normal_quantile(0.5 + self.config.interval_width / 2.0)?,
            trend_uncertainty: self.config.trend_uncertainty,
        };

        let seasonal_columns = 2 * (weekly_order + yearly_order);
        let width = 2 + seasonal_columns + regressor_count;

        let mut design = Array2::<f64>::zeros((rows.len(), width));
        for (mut out, row) in design.rows_mut().into_iter().zip(rows) {
            out.assign(&fitted.design_row(row.date, &row.regressors));
        }
        let targets: Array1<f64> = rows.iter().map(|row| row.target / y_scale).collect();

        let penalty: Array1<f64> = std::iter::repeat(TREND_PENALTY)
            .take(2)
            .chain(
                std::iter::repeat(self.config.seasonality_prior_scale.powi(-2))
                    .take(seasonal_columns),
            )
            .chain(
                std::iter::repeat(self.config.regressor_prior_scale.powi(-2))
                    .take(regressor_count),
            )
            .collect();

        fitted.coefficients = penalised_least_squares(&design, &targets, &penalty)?;

        let residuals = design.dot(&fitted.coefficients) - &targets;
        fitted.sigma = (residuals.mapv(|r| r * r).sum() / n).sqrt();

        debug!(
            rows = rows.len(),
            regressors = regressor_count,
            weekly_order,
            yearly_order,
            sigma = fitted.sigma * y_scale,
            "fitted additive model"
        );

        Ok(fitted)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedAdditiveModel {
    /// Model coefficients in design-column order
    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    /// In-sample residual standard deviation, in target units
    pub fn residual_std(&self) -> f64 {
        self.sigma * self.y_scale
    }

    /// Number of seasonal Fourier columns in use
    pub fn seasonal_columns(&self) -> usize {
        2 * (self.weekly_order + self.yearly_order)
    }

    fn design_row(&self, date: NaiveDate, regressors: &[f64]) -> Array1<f64> {
        let t = (date - self.start).num_days() as f64 / self.span_days;
        let day = date.num_days_from_ce() as f64;

        let mut row = Vec::with_capacity(2 + self.seasonal_columns() + regressors.len());
        row.push(1.0);
        row.push(t);
        push_fourier(&mut row, day, WEEK_DAYS, self.weekly_order);
        push_fourier(&mut row, day, YEAR_DAYS, self.yearly_order);
        row.extend(
            regressors
                .iter()
                .zip(&self.regressor_stats)
                .map(|(value, (mean, std))| (value - mean) / std),
        );
        Array1::from(row)
    }
}

impl FittedRegressorModel for FittedAdditiveModel {
    fn predict(&self, rows: &[RegressorRow]) -> Result<Vec<Estimate>> {
        rows.iter()
            .map(|row| {
                if row.regressors.len() != self.regressor_stats.len() {
                    return Err(ForecastError::InvalidParameter(format!(
                        "Row {} has {} regressors, expected {}",
                        row.date,
                        row.regressors.len(),
                        self.regressor_stats.len()
                    )));
                }
                if row.regressors.iter().any(|v| !v.is_finite()) {
                    return Err(ForecastError::ModelError(format!(
                        "Non-finite regressor on {}",
                        row.date
                    )));
                }

                let x = self.design_row(row.date, &row.regressors);
                let yhat = x.dot(&self.coefficients) * self.y_scale;

                let steps_ahead =
                    ((row.date - self.last_date).num_days() as f64 / self.step_days).max(0.0);
                let spread = self.sigma * (1.0 + self.trend_uncertainty * steps_ahead).sqrt();
                let half_width = self.z_score * spread * self.y_scale;

                Estimate::new(yhat, yhat - half_width, yhat + half_width)
            })
            .collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn push_fourier(row: &mut Vec<f64>, day: f64, period: f64, order: usize) {
    for k in 1..=order {
        let angle = 2.0 * PI * k as f64 * day / period;
        row.push(angle.sin());
        row.push(angle.cos());
    }
}

fn standard_normal_quantile(p: f64) -> Result<f64> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| ForecastError::ModelError(e.to_string()))?;
    Ok(normal.inverse_cdf(p))
}
