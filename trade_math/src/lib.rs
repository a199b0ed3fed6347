//! # Trade Math
//!
//! Mathematical calculations for technical indicators.
//! This crate provides streaming implementations of the moving averages and
//! oscillators used as forecast regressors, whole-series helpers built on top
//! of them, and simple price transforms.

use thiserror::Error;

// Indicator modules
pub mod moving_averages;
pub mod oscillators;
pub mod series;
pub mod transforms;

/// Errors that can occur in trading-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;
