//! # Equity Forecast
//!
//! Workspace facade over the indicator math and the iterative forecaster.
//!
//! ## Example
//!
//! ```
//! use equity_forecast_workspace::forecast::{IndicatorSet, StepPolicy};
//!
//! let indicators = IndicatorSet::standard();
//! assert_eq!(indicators.max_lookback(), 50);
//!
//! let friday = chrono::NaiveDate::from_ymd_opt(2024, 3, 22).unwrap();
//! let monday = chrono::NaiveDate::from_ymd_opt(2024, 3, 25).unwrap();
//! assert_eq!(StepPolicy::BusinessDay.next_date(friday), monday);
//! ```

/// Streaming and series indicator calculations
pub use trade_math as math;

/// Feature tables, models and the iterative forecaster
pub use regressor_forecast as forecast;
