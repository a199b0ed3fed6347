//! Price history loading and the feature table the forecaster works on

use crate::error::{ForecastError, Result};
use crate::indicators::IndicatorSet;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// One daily price bar as supplied by the data-acquisition side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(alias = "Date")]
    pub date: NaiveDate,
    #[serde(default, alias = "Open")]
    pub open: Option<f64>,
    #[serde(default, alias = "High")]
    pub high: Option<f64>,
    #[serde(default, alias = "Low")]
    pub low: Option<f64>,
    #[serde(alias = "Close")]
    pub close: f64,
    #[serde(default, alias = "Volume")]
    pub volume: Option<f64>,
}

impl PriceBar {
    /// A bar carrying only a close price
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }
}

/// Data loader for daily price bars
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load price bars from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<PriceBar>> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load price bars from any CSV source with a header row
    ///
    /// Bars are returned sorted by date. Duplicate dates and non-finite or
    /// non-positive closes are rejected.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<PriceBar>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut bars = Vec::new();
        for record in csv_reader.deserialize() {
            let bar: PriceBar = record?;
            if !bar.close.is_finite() || bar.close <= 0.0 {
                return Err(ForecastError::DataError(format!(
                    "Invalid close price {} on {}",
                    bar.close, bar.date
                )));
            }
            bars.push(bar);
        }

        if bars.is_empty() {
            return Err(ForecastError::DataError(
                "No price bars found in data".to_string(),
            ));
        }

        bars.sort_by_key(|bar| bar.date);
        if let Some(pair) = bars.windows(2).find(|pair| pair[0].date == pair[1].date) {
            return Err(ForecastError::DataError(format!(
                "Duplicate date in price data: {}",
                pair[0].date
            )));
        }

        Ok(bars)
    }
}

/// One dated row of the feature table
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Row date
    pub date: NaiveDate,
    /// Close price, `None` while a future row awaits its prediction
    pub target: Option<f64>,
    /// One value per indicator, `None` inside a look-back window
    pub features: Vec<Option<f64>>,
}

impl FeatureRow {
    /// Whether every indicator value is present
    pub fn is_complete(&self) -> bool {
        self.features.iter().all(Option::is_some)
    }

    /// Indicator values, if all are present
    pub fn complete_features(&self) -> Option<Vec<f64>> {
        self.features.iter().copied().collect()
    }
}

/// Date-ordered table of targets and indicator values
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    indicators: IndicatorSet,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// Build a table from rows whose indicators were computed elsewhere
    pub fn new(indicators: IndicatorSet, rows: Vec<FeatureRow>) -> Result<Self> {
        if let Some(row) = rows.iter().find(|row| row.features.len() != indicators.len()) {
            return Err(ForecastError::DataError(format!(
                "Row {} has {} indicator values, expected {}",
                row.date,
                row.features.len(),
                indicators.len()
            )));
        }

        if let Some(pair) = rows.windows(2).find(|pair| pair[0].date >= pair[1].date) {
            return Err(ForecastError::DataError(format!(
                "Dates must be strictly increasing: {} is followed by {}",
                pair[0].date, pair[1].date
            )));
        }

        Ok(Self { indicators, rows })
    }

    /// Build a table from dated closes, computing every indicator
    pub fn from_closes(
        dates: &[NaiveDate],
        closes: &[f64],
        indicators: IndicatorSet,
    ) -> Result<Self> {
        if dates.len() != closes.len() {
            return Err(ForecastError::ValidationError(format!(
                "Dates length ({}) doesn't match closes length ({})",
                dates.len(),
                closes.len()
            )));
        }

        let feature_rows = indicators.compute_rows(closes)?;
        let rows = dates
            .iter()
            .zip(closes)
            .zip(feature_rows)
            .map(|((&date, &close), features)| FeatureRow {
                date,
                target: Some(close),
                features,
            })
            .collect();

        Self::new(indicators, rows)
    }

    /// Build a table from price bars, using their closes as targets
    pub fn from_bars(bars: &[PriceBar], indicators: IndicatorSet) -> Result<Self> {
        let dates: Vec<NaiveDate> = bars.iter().map(|bar| bar.date).collect();
        let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
        Self::from_closes(&dates, &closes, indicators)
    }

    /// Indicator definitions of the columns
    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }

    /// All rows in date order
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Date of the last row
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|row| row.date)
    }

    /// Rows with every indicator present
    pub fn complete_rows(&self) -> impl Iterator<Item = &FeatureRow> {
        self.rows.iter().filter(|row| row.is_complete())
    }

    /// Values of a named indicator column
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let index = self
            .indicators
            .indicators()
            .iter()
            .position(|indicator| indicator.name() == name)?;
        Some(self.rows.iter().map(|row| row.features[index]).collect())
    }

    /// Target values; fails if any row is still awaiting its target
    pub fn targets(&self) -> Result<Vec<f64>> {
        self.rows
            .iter()
            .map(|row| {
                row.target.ok_or_else(|| {
                    ForecastError::DataError(format!("Row {} has no target value", row.date))
                })
            })
            .collect()
    }

    /// Append a row after the current last date
    pub fn push(&mut self, row: FeatureRow) -> Result<()> {
        if row.features.len() != self.indicators.len() {
            return Err(ForecastError::DataError(format!(
                "Row {} has {} indicator values, expected {}",
                row.date,
                row.features.len(),
                self.indicators.len()
            )));
        }
        if let Some(last) = self.last_date() {
            if row.date <= last {
                return Err(ForecastError::DataError(format!(
                    "Cannot append {} after {}",
                    row.date, last
                )));
            }
        }
        self.rows.push(row);
        Ok(())
    }

    /// Set the target of the most recent row
    pub fn commit_last_target(&mut self, value: f64) -> Result<()> {
        let last = self
            .rows
            .last_mut()
            .ok_or_else(|| ForecastError::DataError("Feature table is empty".to_string()))?;
        last.target = Some(value);
        Ok(())
    }

    /// Recompute every indicator over the full target series
    pub fn recompute_indicators(&mut self) -> Result<()> {
        let closes = self.targets()?;
        let feature_rows = self.indicators.compute_rows(&closes)?;
        for (row, features) in self.rows.iter_mut().zip(feature_rows) {
            row.features = features;
        }
        Ok(())
    }

    /// Export as a polars DataFrame with columns `ds`, `y` and one per indicator
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let targets: Vec<Option<f64>> = self.rows.iter().map(|row| row.target).collect();

        let mut columns = vec![
            date_series("ds", self.rows.iter().map(|row| row.date))?,
            Series::new("y", targets),
        ];
        for (index, name) in self.indicators.names().iter().enumerate() {
            let values: Vec<Option<f64>> =
                self.rows.iter().map(|row| row.features[index]).collect();
            columns.push(Series::new(name.as_str(), values));
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// Polars `Date` column (days since the Unix epoch)
pub(crate) fn date_series(name: &str, dates: impl Iterator<Item = NaiveDate>) -> Result<Series> {
    let days: Vec<i32> = dates
        .map(|date| date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
        .collect();
    Ok(Series::new(name, days).cast(&DataType::Date)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::Indicator;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_reader_sorts_and_accepts_capitalised_headers() {
        let csv = "Date,Open,High,Low,Close,Volume\n\
                   2024-01-03,10,11,9,10.5,100\n\
                   2024-01-02,10,11,9,10.0,100\n";
        let bars = DataLoader::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, date(2024, 1, 2));
        assert_eq!(bars[1].close, 10.5);
    }

    #[test]
    fn test_from_reader_close_only() {
        let csv = "date,close\n2024-01-02,10.0\n";
        let bars = DataLoader::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(bars, vec![PriceBar::from_close(date(2024, 1, 2), 10.0)]);
    }

    #[test]
    fn test_from_reader_rejects_duplicates() {
        let csv = "date,close\n2024-01-02,10.0\n2024-01-02,11.0\n";
        assert!(matches!(
            DataLoader::from_reader(csv.as_bytes()),
            Err(ForecastError::DataError(_))
        ));
    }

    #[test]
    fn test_push_and_recompute() {
        let indicators = IndicatorSet::new(vec![Indicator::Sma { window: 2 }]).unwrap();
        let mut table = FeatureTable::from_closes(
            &[date(2024, 1, 1), date(2024, 1, 2)],
            &[1.0, 3.0],
            indicators,
        )
        .unwrap();
        assert_eq!(table.column("MA2Day").unwrap(), vec![None, Some(2.0)]);

        table
            .push(FeatureRow {
                date: date(2024, 1, 3),
                target: None,
                features: vec![Some(2.0)],
            })
            .unwrap();
        assert!(table.recompute_indicators().is_err());

        table.commit_last_target(5.0).unwrap();
        table.recompute_indicators().unwrap();
        assert_eq!(table.column("MA2Day").unwrap(), vec![None, Some(2.0), Some(4.0)]);

        let stale = FeatureRow {
            date: date(2024, 1, 3),
            target: Some(1.0),
            features: vec![None],
        };
        assert!(table.push(stale).is_err());
    }

    #[test]
    fn test_new_rejects_unordered_dates() {
        let indicators = IndicatorSet::new(vec![Indicator::Sma { window: 2 }]).unwrap();
        let rows = vec![
            FeatureRow {
                date: date(2024, 1, 2),
                target: Some(1.0),
                features: vec![None],
            },
            FeatureRow {
                date: date(2024, 1, 1),
                target: Some(1.0),
                features: vec![None],
            },
        ];
        assert!(FeatureTable::new(indicators, rows).is_err());
    }
}
