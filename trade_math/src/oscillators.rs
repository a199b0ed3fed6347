//! Oscillator indicator implementations
//!
//! Contains implementations of momentum oscillators:
//! - Relative Strength Index (RSI)
//! - Moving Average Convergence Divergence (MACD)

use crate::moving_averages::ExponentialMovingAverage;
use crate::{MathError, Result};

/// Relative Strength Index (RSI) implementation
///
/// Gains and losses are smoothed with Wilder's recursion (`alpha = 1 / period`)
/// starting from the first price, whose change counts as zero. A value is
/// reported once `period` prices have been seen.
#[derive(Debug, Clone)]
pub struct RelativeStrengthIndex {
    period: usize,
    previous_price: Option<f64>,
    avg_gain: Option<f64>,
    avg_loss: Option<f64>,
    values_seen: usize,
}

impl RelativeStrengthIndex {
    /// Create a new RSI with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            previous_price: None,
            avg_gain: None,
            avg_loss: None,
            values_seen: 0,
        })
    }

    /// Update the RSI with a new price value
    pub fn update(&mut self, price: f64) -> Result<()> {
        if !price.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "RSI input must be finite, got {}",
                price
            )));
        }

        self.values_seen += 1;

        let change = self.previous_price.map_or(0.0, |prev| price - prev);
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        let alpha = 1.0 / self.period as f64;
        self.avg_gain = Some(match self.avg_gain {
            Some(avg) => alpha * gain + (1.0 - alpha) * avg,
            None => gain,
        });
        self.avg_loss = Some(match self.avg_loss {
            Some(avg) => alpha * loss + (1.0 - alpha) * avg,
            None => loss,
        });

        self.previous_price = Some(price);

        Ok(())
    }

    /// Get the current RSI value (0-100)
    pub fn value(&self) -> Result<f64> {
        if self.values_seen < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for RSI calculation. Need {} values, have {}.",
                self.period, self.values_seen
            )));
        }

        match (self.avg_gain, self.avg_loss) {
            (Some(_), Some(avg_loss)) if avg_loss == 0.0 => Ok(100.0),
            (Some(avg_gain), Some(avg_loss)) => {
                let rs = avg_gain / avg_loss;
                Ok(100.0 - (100.0 / (1.0 + rs)))
            }
            _ => Err(MathError::CalculationError(
                "RSI averages not calculated".to_string(),
            )),
        }
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the RSI, clearing all values
    pub fn reset(&mut self) {
        self.previous_price = None;
        self.avg_gain = None;
        self.avg_loss = None;
        self.values_seen = 0;
    }
}

/// Moving Average Convergence Divergence (MACD) implementation
///
/// The signal EMA only starts once the MACD line is defined, i.e. after
/// `slow_period` prices, so the signal needs `slow_period + signal_period - 1`
/// prices in total.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_ema: ExponentialMovingAverage,
    slow_ema: ExponentialMovingAverage,
    signal_ema: ExponentialMovingAverage,
    values_seen: usize,
}

impl Macd {
    /// Create a new MACD with the specified parameters
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Result<Self> {
        if fast_period >= slow_period {
            return Err(MathError::InvalidInput(
                "Fast period must be smaller than slow period".to_string(),
            ));
        }

        if signal_period == 0 {
            return Err(MathError::InvalidInput(
                "Signal period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            fast_ema: ExponentialMovingAverage::new(fast_period)?,
            slow_ema: ExponentialMovingAverage::new(slow_period)?,
            signal_ema: ExponentialMovingAverage::new(signal_period)?,
            values_seen: 0,
        })
    }

    /// Update the MACD with a new price value
    pub fn update(&mut self, price: f64) -> Result<()> {
        self.values_seen += 1;

        self.fast_ema.update(price)?;
        self.slow_ema.update(price)?;

        if let Ok(macd_value) = self.macd_value() {
            self.signal_ema.update(macd_value)?;
        }

        Ok(())
    }

    /// Get the current MACD line value (fast EMA - slow EMA)
    pub fn macd_value(&self) -> Result<f64> {
        match (self.fast_ema.value(), self.slow_ema.value()) {
            (Ok(fast), Ok(slow)) => Ok(fast - slow),
            _ => Err(MathError::InsufficientData(format!(
                "Not enough data to calculate MACD line. Need {} values, have {}.",
                self.slow_period(),
                self.values_seen
            ))),
        }
    }

    /// Get the current signal line value (EMA of MACD)
    pub fn signal_value(&self) -> Result<f64> {
        self.signal_ema.value().map_err(|_| {
            MathError::InsufficientData(format!(
                "Not enough data to calculate signal line. Need {} values, have {}.",
                self.slow_period() + self.signal_period() - 1,
                self.values_seen
            ))
        })
    }

    /// Get the current histogram value (MACD line - signal line)
    pub fn histogram(&self) -> Result<f64> {
        Ok(self.macd_value()? - self.signal_value()?)
    }

    /// Get the fast period
    pub fn fast_period(&self) -> usize {
        self.fast_ema.period()
    }

    /// Get the slow period
    pub fn slow_period(&self) -> usize {
        self.slow_ema.period()
    }

    /// Get the signal period
    pub fn signal_period(&self) -> usize {
        self.signal_ema.period()
    }

    /// Reset the MACD, clearing all values
    pub fn reset(&mut self) {
        self.fast_ema.reset();
        self.slow_ema.reset();
        self.signal_ema.reset();
        self.values_seen = 0;
    }
}
