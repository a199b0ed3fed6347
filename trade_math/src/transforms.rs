//! Price transforms used to compare an equity against market indices

use crate::{MathError, Result};

/// Logarithmic returns, `ln(p_t / p_{t-1})`
///
/// The first entry has no predecessor and is `None`.
pub fn log_returns(prices: &[f64]) -> Result<Vec<Option<f64>>> {
    if let Some(bad) = prices.iter().find(|p| !p.is_finite() || **p <= 0.0) {
        return Err(MathError::InvalidInput(format!(
            "Log returns need strictly positive prices, got {}",
            bad
        )));
    }

    let mut returns = Vec::with_capacity(prices.len());
    if !prices.is_empty() {
        returns.push(None);
    }
    returns.extend(prices.windows(2).map(|w| Some((w[1] / w[0]).ln())));

    Ok(returns)
}

/// Min-max normalisation onto `[0, 1]`
pub fn min_max_normalize(values: &[f64]) -> Result<Vec<f64>> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot normalise an empty series".to_string(),
        ));
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if !range.is_finite() || range == 0.0 {
        return Err(MathError::CalculationError(format!(
            "Series range must be positive and finite, got {}",
            range
        )));
    }

    Ok(values.iter().map(|v| (v - min) / range).collect())
}
