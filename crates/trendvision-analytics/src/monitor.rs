//! Spike detection over daily post counts.

use chrono::NaiveDate;
use serde::Serialize;
use trendvision_core::{DailySeries, PostRecord};
use trendvision_store::{PostStore, StoreError};

use crate::aggregate::{daily_counts, top_keyword, NO_KEYWORD};
use crate::alert::SlackNotifier;

/// Days before the latest one averaged into the baseline.
pub const BASELINE_WINDOW: usize = 7;

/// The latest day crossed the spike threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spike {
    pub date: NaiveDate,
    pub latest: usize,
    pub baseline: f64,
}

/// Check whether the latest count exceeds `multiplier` times the mean of up
/// to [`BASELINE_WINDOW`] preceding counts.
///
/// Series shorter than two entries, and a zero baseline, never spike.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn detect_spike(series: &DailySeries, multiplier: f64) -> Option<Spike> {
    let latest = series.last()?;
    let baseline = series.trailing_mean_before_last(BASELINE_WINDOW)?;
    if baseline > 0.0 && latest.count as f64 > baseline * multiplier {
        Some(Spike {
            date: latest.date,
            latest: latest.count,
            baseline,
        })
    } else {
        None
    }
}

/// A detected spike plus the store-wide mode keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpikeAlert {
    #[serde(flatten)]
    pub spike: Spike,
    pub top_keyword: String,
}

impl SpikeAlert {
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Spike detected: {} posts on {} (baseline {:.1}). Top keyword: {}",
            self.spike.latest, self.spike.date, self.spike.baseline, self.top_keyword
        )
    }
}

/// Stateless spike check with best-effort delivery.
#[derive(Debug)]
pub struct SpikeMonitor {
    multiplier: f64,
    notifier: Option<SlackNotifier>,
}

impl SpikeMonitor {
    #[must_use]
    pub fn new(multiplier: f64, notifier: Option<SlackNotifier>) -> Self {
        Self {
            multiplier,
            notifier,
        }
    }

    /// Detect a spike in `records` and, if one fires, try to deliver it.
    ///
    /// The returned alert depends only on the records. Delivery failures are
    /// logged and dropped; a missing notifier skips delivery.
    pub async fn check(&self, records: &[PostRecord]) -> Option<SpikeAlert> {
        let series = daily_counts(records);
        let Some(spike) = detect_spike(&series, self.multiplier) else {
            tracing::debug!(
                dates = series.len(),
                multiplier = self.multiplier,
                "no spike"
            );
            return None;
        };

        let alert = SpikeAlert {
            spike,
            top_keyword: top_keyword(records).unwrap_or_else(|| NO_KEYWORD.to_string()),
        };
        tracing::info!(
            date = %alert.spike.date,
            latest = alert.spike.latest,
            baseline = alert.spike.baseline,
            top_keyword = %alert.top_keyword,
            "spike detected"
        );
        self.deliver(&alert).await;
        Some(alert)
    }

    async fn deliver(&self, alert: &SpikeAlert) {
        let Some(notifier) = &self.notifier else {
            tracing::info!("alert token not set; skipping delivery");
            return;
        };
        match notifier.send(&alert.message()).await {
            Ok(()) => tracing::info!(channel = notifier.channel(), "spike alert delivered"),
            Err(e) => tracing::warn!(
                channel = notifier.channel(),
                error = %e,
                "spike alert delivery failed"
            ),
        }
    }
}

/// Load the store and run `monitor` over it.
///
/// # Errors
///
/// Returns [`StoreError::MissingInput`] if the store does not exist, or
/// another [`StoreError`] if it cannot be read. Delivery failures are not
/// errors.
pub async fn run_spike_check(
    store: &PostStore,
    monitor: &SpikeMonitor,
) -> Result<Option<SpikeAlert>, StoreError> {
    let records = store.load()?;
    Ok(monitor.check(&records).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(counts: &[usize]) -> DailySeries {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        DailySeries::from_counts(
            counts
                .iter()
                .enumerate()
                .map(|(i, &c)| (start + chrono::Duration::days(i64::try_from(i).unwrap()), c)),
        )
    }

    #[test]
    fn spike_fires_above_threshold() {
        let spike = detect_spike(&series(&[5, 5, 5, 5, 5, 5, 5, 30]), 3.0).unwrap();
        assert_eq!(spike.latest, 30);
        assert_eq!(spike.baseline, 5.0);
        assert_eq!(spike.date, NaiveDate::from_ymd_opt(2024, 5, 8).unwrap());
    }

    #[test]
    fn no_spike_at_or_below_threshold() {
        assert!(detect_spike(&series(&[5, 5, 5, 5, 5, 5, 5, 12]), 3.0).is_none());
        assert!(detect_spike(&series(&[5, 5, 5, 5, 5, 5, 5, 15]), 3.0).is_none());
    }

    #[test]
    fn single_entry_is_a_no_op() {
        assert!(detect_spike(&series(&[100]), 3.0).is_none());
        assert!(detect_spike(&DailySeries::default(), 3.0).is_none());
    }

    #[test]
    fn baseline_uses_only_last_seven_preceding_days() {
        // The 100 is eight days back and falls outside the window.
        let spike = detect_spike(&series(&[100, 2, 2, 2, 2, 2, 2, 2, 7]), 3.0).unwrap();
        assert_eq!(spike.baseline, 2.0);
    }

    #[test]
    fn message_formats_baseline_with_one_decimal() {
        let alert = SpikeAlert {
            spike: Spike {
                date: NaiveDate::from_ymd_opt(2024, 5, 8).unwrap(),
                latest: 30,
                baseline: 5.0,
            },
            top_keyword: "rust".to_string(),
        };
        assert_eq!(
            alert.message(),
            "Spike detected: 30 posts on 2024-05-08 (baseline 5.0). Top keyword: rust"
        );
    }
}
