//! Technical indicators used as model regressors

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use trade_math::series;

/// A single indicator column derived from the close-price series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Indicator {
    /// Simple moving average
    Sma { window: usize },
    /// Exponential moving average
    Ema { window: usize },
    /// Relative strength index
    Rsi { window: usize },
    /// MACD line (fast EMA - slow EMA)
    MacdLine { fast: usize, slow: usize },
    /// EMA of the MACD line
    MacdSignal {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

impl Indicator {
    /// Column name, e.g. `MA10Day`, `RSI14Day`, `Signal`
    pub fn name(&self) -> String {
        match self {
            Indicator::Sma { window } => format!("MA{}Day", window),
            Indicator::Ema { window } => format!("EMA{}Day", window),
            Indicator::Rsi { window } => format!("RSI{}Day", window),
            Indicator::MacdLine { .. } => "MACD".to_string(),
            Indicator::MacdSignal { .. } => "Signal".to_string(),
        }
    }

    /// Number of prices needed before the first value is defined
    pub fn lookback(&self) -> usize {
        match *self {
            Indicator::Sma { window } | Indicator::Ema { window } | Indicator::Rsi { window } => {
                window
            }
            Indicator::MacdLine { slow, .. } => slow,
            Indicator::MacdSignal { slow, signal, .. } => slow + signal - 1,
        }
    }

    /// Check the indicator parameters
    pub fn validate(&self) -> Result<()> {
        match *self {
            Indicator::Sma { window } | Indicator::Ema { window } | Indicator::Rsi { window }
                if window == 0 =>
            {
                Err(ForecastError::InvalidParameter(format!(
                    "{}: window must be greater than zero",
                    self
                )))
            }
            Indicator::MacdLine { fast, slow } | Indicator::MacdSignal { fast, slow, .. }
                if fast == 0 || fast >= slow =>
            {
                Err(ForecastError::InvalidParameter(format!(
                    "{}: fast period ({}) must be positive and smaller than slow period ({})",
                    self, fast, slow
                )))
            }
            Indicator::MacdSignal { signal: 0, .. } => Err(ForecastError::InvalidParameter(
                format!("{}: signal period must be greater than zero", self),
            )),
            _ => Ok(()),
        }
    }

    /// Compute the indicator over a close-price series
    pub fn compute(&self, closes: &[f64]) -> Result<Vec<Option<f64>>> {
        let values = match *self {
            Indicator::Sma { window } => series::sma(closes, window)?,
            Indicator::Ema { window } => series::ema(closes, window)?,
            Indicator::Rsi { window } => series::rsi(closes, window)?,
            Indicator::MacdLine { fast, slow } => {
                // The signal period does not affect the line.
                series::macd(closes, fast, slow, 1)?.0
            }
            Indicator::MacdSignal { fast, slow, signal } => {
                series::macd(closes, fast, slow, signal)?.1
            }
        };
        Ok(values)
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Ordered, uniquely named set of indicators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Indicator>", into = "Vec<Indicator>")]
pub struct IndicatorSet {
    indicators: Vec<Indicator>,
}

impl IndicatorSet {
    /// Create a validated indicator set
    pub fn new(indicators: Vec<Indicator>) -> Result<Self> {
        if indicators.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Indicator set must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for indicator in &indicators {
            indicator.validate()?;
            if !seen.insert(indicator.name()) {
                return Err(ForecastError::InvalidParameter(format!(
                    "Duplicate indicator column: {}",
                    indicator
                )));
            }
        }

        Ok(Self { indicators })
    }

    /// Default regressors:
    /// `EMA10Day, MA10Day, MA30Day, RSI14Day, RSI3Day, RSI9Day, MA50Day, Signal`
    pub fn standard() -> Self {
        Self {
            indicators: vec![
                Indicator::Ema { window: 10 },
                Indicator::Sma { window: 10 },
                Indicator::Sma { window: 30 },
                Indicator::Rsi { window: 14 },
                Indicator::Rsi { window: 3 },
                Indicator::Rsi { window: 9 },
                Indicator::Sma { window: 50 },
                Indicator::MacdSignal {
                    fast: 12,
                    slow: 26,
                    signal: 9,
                },
            ],
        }
    }

    /// The indicators, in column order
    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    /// Column names, in order
    pub fn names(&self) -> Vec<String> {
        self.indicators.iter().map(Indicator::name).collect()
    }

    /// Number of indicator columns
    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    /// Always false for a validated set
    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    /// Largest look-back window of the set
    pub fn max_lookback(&self) -> usize {
        self.indicators
            .iter()
            .map(Indicator::lookback)
            .max()
            .unwrap_or(0)
    }

    /// Compute every indicator and return one row of values per price
    pub fn compute_rows(&self, closes: &[f64]) -> Result<Vec<Vec<Option<f64>>>> {
        let columns = self
            .indicators
            .iter()
            .map(|indicator| indicator.compute(closes))
            .collect::<Result<Vec<_>>>()?;

        Ok((0..closes.len())
            .map(|i| columns.iter().map(|column| column[i]).collect())
            .collect())
    }
}

impl Default for IndicatorSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<Indicator>> for IndicatorSet {
    type Error = ForecastError;

    fn try_from(indicators: Vec<Indicator>) -> Result<Self> {
        Self::new(indicators)
    }
}

impl From<IndicatorSet> for Vec<Indicator> {
    fn from(set: IndicatorSet) -> Self {
        set.indicators
    }
}
