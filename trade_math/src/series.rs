//! Whole-series indicator helpers
//!
//! Each function feeds a price series through the corresponding streaming
//! indicator and returns one entry per input value, `None` while the
//! indicator is still warming up.

use crate::moving_averages::{ExponentialMovingAverage, SimpleMovingAverage};
use crate::oscillators::{Macd, RelativeStrengthIndex};
use crate::Result;

/// Simple moving average over the whole series
pub fn sma(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut indicator = SimpleMovingAverage::new(period)?;
    values
        .iter()
        .map(|&value| -> Result<Option<f64>> {
            indicator.update(value)?;
            Ok(indicator.value().ok())
        })
        .collect()
}

/// Exponential moving average over the whole series
pub fn ema(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut indicator = ExponentialMovingAverage::new(period)?;
    values
        .iter()
        .map(|&value| -> Result<Option<f64>> {
            indicator.update(value)?;
            Ok(indicator.value().ok())
        })
        .collect()
}

/// Relative strength index over the whole series
pub fn rsi(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut indicator = RelativeStrengthIndex::new(period)?;
    values
        .iter()
        .map(|&value| -> Result<Option<f64>> {
            indicator.update(value)?;
            Ok(indicator.value().ok())
        })
        .collect()
}

/// MACD line and signal line over the whole series
pub fn macd(
    values: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Result<(Vec<Option<f64>>, Vec<Option<f64>>)> {
    let mut indicator = Macd::new(fast_period, slow_period, signal_period)?;
    let mut line = Vec::with_capacity(values.len());
    let mut signal = Vec::with_capacity(values.len());

    for &value in values {
        indicator.update(value)?;
        line.push(indicator.macd_value().ok());
        signal.push(indicator.signal_value().ok());
    }

    Ok((line, signal))
}
