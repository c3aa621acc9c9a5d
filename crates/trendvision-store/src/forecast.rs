//! The forecast output file: `(date, predicted_count)` rows, overwritten each run.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use trendvision_core::ForecastPoint;

use crate::atomic::write_csv_atomically;
use crate::error::StoreError;

#[derive(Debug, Deserialize)]
struct RawForecastRow {
    #[serde(alias = "ds")]
    date: String,
    #[serde(alias = "yhat")]
    predicted_count: String,
}

#[derive(Debug, Clone)]
pub struct ForecastFile {
    path: PathBuf,
}

impl ForecastFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the file with `points`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be written.
    pub fn write(&self, points: &[ForecastPoint]) -> Result<(), StoreError> {
        write_csv_atomically(&self.path, |writer| {
            writer.write_record(["date", "predicted_count"])?;
            for point in points {
                writer.write_record([
                    point.date.format("%Y-%m-%d").to_string(),
                    point.predicted_count.to_string(),
                ])?;
            }
            Ok(())
        })
    }

    /// Read the forecast rows. An absent file reads as no rows.
    ///
    /// Accepts `ds`/`yhat` column names and datetime-formatted dates
    /// (`2024-01-01 00:00:00`); unparseable rows are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Csv`] if the file exists but is not valid CSV.
    pub fn read_or_empty(&self) -> Result<Vec<ForecastPoint>, StoreError> {
        if !self.path.is_file() {
            return Ok(Vec::new());
        }

        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| StoreError::csv(&self.path, e))?;
        let mut points = Vec::new();
        for row in reader.deserialize::<RawForecastRow>() {
            let row = row.map_err(|e| StoreError::csv(&self.path, e))?;
            let date = row
                .date
                .trim()
                .get(..10)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
            let value = row
                .predicted_count
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite());
            match (date, value) {
                (Some(date), Some(predicted_count)) => points.push(ForecastPoint {
                    date,
                    predicted_count,
                }),
                _ => tracing::warn!(
                    path = %self.path.display(),
                    date = %row.date,
                    "skipping unparseable forecast row"
                ),
            }
        }
        Ok(points)
    }
}
