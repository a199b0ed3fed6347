//! Forecaster configuration loaded from JSON

use crate::calendar::StepPolicy;
use crate::data::{FeatureTable, PriceBar};
use crate::error::Result;
use crate::forecaster::IterativeForecaster;
use crate::indicators::IndicatorSet;
use crate::models::{AdditiveConfig, AdditiveModel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for building a forecaster and its feature table
///
/// Every field is optional in JSON; missing fields take their defaults.
///
/// ```json
/// {
///   "exclude_weekends": true,
///   "indicators": [
///     { "kind": "sma", "window": 10 },
///     { "kind": "rsi", "window": 14 },
///     { "kind": "macd_signal", "fast": 12, "slow": 26, "signal": 9 }
///   ],
///   "model": { "interval_width": 0.9, "yearly_seasonality": "disabled" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecasterConfig {
    /// Skip Saturdays and Sundays when stepping into the future
    pub exclude_weekends: bool,
    /// Indicator columns used as regressors
    pub indicators: IndicatorSet,
    /// Additive model parameters
    pub model: AdditiveConfig,
}

impl Default for ForecasterConfig {
    fn default() -> Self {
        Self {
            exclude_weekends: true,
            indicators: IndicatorSet::standard(),
            model: AdditiveConfig::default(),
        }
    }
}

impl ForecasterConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check every parameter
    pub fn validate(&self) -> Result<()> {
        // Re-validates sets built in code rather than deserialised.
        IndicatorSet::new(self.indicators.indicators().to_vec())?;
        self.model.validate()
    }

    /// Date stepping implied by `exclude_weekends`
    pub fn step_policy(&self) -> StepPolicy {
        StepPolicy::from_exclude_weekends(self.exclude_weekends)
    }

    /// Additive model with these parameters
    pub fn build_model(&self) -> Result<AdditiveModel> {
        AdditiveModel::new(self.model.clone())
    }

    /// Feature table over `bars` with the configured indicator columns
    pub fn feature_table(&self, bars: &[PriceBar]) -> Result<FeatureTable> {
        FeatureTable::from_bars(bars, self.indicators.clone())
    }

    /// Unfitted forecaster over the additive model
    pub fn build_forecaster(&self) -> Result<IterativeForecaster<AdditiveModel>> {
        IterativeForecaster::from_config(self.build_model()?, self)
    }
}
