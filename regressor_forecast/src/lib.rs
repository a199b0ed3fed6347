//! # Regressor Forecast
//!
//! Multi-step price forecasting with technical indicators as regressors.
//!
//! ## Features
//!
//! - Daily price history loading (CSV) and indicator feature tables
//! - Business-day or calendar-day stepping into the future
//! - An additive trend + seasonality regression model with extra regressors
//!   and uncertainty intervals
//! - An iterative forecaster that recomputes the indicators from its own
//!   predictions after every step
//! - Accuracy metrics and hold-out evaluation
//!
//! ## Quick Start
//!
//! ```no_run
//! use regressor_forecast::{DataLoader, ForecasterConfig};
//!
//! # fn main() -> regressor_forecast::Result<()> {
//! let config = ForecasterConfig::default();
//! let bars = DataLoader::from_csv("prices.csv")?;
//! let history = config.feature_table(&bars)?;
//!
//! let mut forecaster = config.build_forecaster()?;
//! forecaster.fit(&history)?;
//!
//! for point in forecaster.predict(5)? {
//!     println!("{} {:.2} [{:.2}, {:.2}]", point.date, point.yhat, point.lower, point.upper);
//! }
//! # Ok(())
//! # }
//! ```

pub mod calendar;
pub mod config;
pub mod data;
pub mod error;
pub mod forecaster;
pub mod indicators;
pub mod metrics;
pub mod models;

// Re-export commonly used types
pub use crate::calendar::StepPolicy;
pub use crate::config::ForecasterConfig;
pub use crate::data::{DataLoader, FeatureRow, FeatureTable, PriceBar};
pub use crate::error::{ForecastError, Result};
pub use crate::forecaster::{ForecastPoint, ForecastRow, ForecastTable, IterativeForecaster};
pub use crate::indicators::{Indicator, IndicatorSet};
pub use crate::metrics::{forecast_accuracy, holdout_evaluation, ForecastAccuracy, HoldoutReport};
pub use crate::models::{
    AdditiveConfig, AdditiveModel, Estimate, FittedRegressorModel, RegressorModel, RegressorRow,
    TrainingRow,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
