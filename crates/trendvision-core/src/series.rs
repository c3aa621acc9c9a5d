//! Daily post-count series and forecast points.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Post counts per calendar date, ascending, one entry per date with at
/// least one post. Dates without posts are absent, not zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DailySeries(Vec<DailyCount>);

impl DailySeries {
    /// Build a series from `(date, count)` pairs in any order.
    ///
    /// Repeated dates are summed and zero counts dropped.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, usize)>,
    {
        let mut by_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for (date, count) in counts {
            *by_date.entry(date).or_insert(0) += count;
        }
        Self(
            by_date
                .into_iter()
                .filter(|&(_, count)| count > 0)
                .map(|(date, count)| DailyCount { date, count })
                .collect(),
        )
    }

    #[must_use]
    pub fn points(&self) -> &[DailyCount] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&DailyCount> {
        self.0.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&DailyCount> {
        self.0.last()
    }

    /// Mean of all counts, `None` for an empty series.
    #[must_use]
    pub fn mean_count(&self) -> Option<f64> {
        mean_of(&self.0)
    }

    /// Mean of up to `window` counts immediately preceding the latest entry.
    ///
    /// `None` when the series has fewer than two entries.
    #[must_use]
    pub fn trailing_mean_before_last(&self, window: usize) -> Option<f64> {
        let (_, history) = self.0.split_last()?;
        let start = history.len().saturating_sub(window);
        mean_of(&history[start..])
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean_of(points: &[DailyCount]) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    let sum: usize = points.iter().map(|p| p.count).sum();
    Some(sum as f64 / points.len() as f64)
}

/// One row of forecast output.
///
/// History and projection share the same shape; they are told apart only by
/// `date` relative to the last observed day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_count: f64,
}
