//! Daily post-volume forecasting.
//!
//! Two models sit behind [`Forecaster`]: an additive trend plus weekly
//! seasonality model and a degraded interpolation model. The model is picked
//! once from configuration; it is never swapped mid-run.

use chrono::{Datelike, Duration, NaiveDate};
use trendvision_core::{DailySeries, ForecastModel, ForecastPoint};
use trendvision_store::{ForecastFile, PostStore};

use crate::aggregate::daily_counts;
use crate::error::ForecastError;

/// Distinct dates required before any model runs.
pub const MIN_DISTINCT_DATES: usize = 2;
/// Observed span, in days, before weekly seasonality is fitted.
const WEEKLY_SEASONALITY_MIN_SPAN_DAYS: i64 = 14;

/// A forecasting model over a daily series with at least
/// [`MIN_DISTINCT_DATES`] entries.
///
/// Output holds one point per observed date (history) followed by one point
/// per day of the horizon after the last observed date.
pub trait Forecaster {
    fn name(&self) -> &'static str;

    fn forecast(&self, series: &DailySeries, horizon_days: u32) -> Vec<ForecastPoint>;
}

#[must_use]
pub fn forecaster_for(model: ForecastModel) -> Box<dyn Forecaster + Send + Sync> {
    match model {
        ForecastModel::Additive => Box::new(AdditiveForecaster),
        ForecastModel::Fallback => Box::new(FallbackForecaster),
    }
}

fn horizon_dates(last: NaiveDate, horizon_days: u32) -> impl Iterator<Item = NaiveDate> {
    (1..=i64::from(horizon_days)).map(move |step| last + Duration::days(step))
}

#[allow(clippy::cast_precision_loss)]
fn history(series: &DailySeries) -> impl Iterator<Item = ForecastPoint> + '_ {
    series.points().iter().map(|p| ForecastPoint {
        date: p.date,
        predicted_count: p.count as f64,
    })
}

/// Run `forecaster` over `series`, applying the thin-data floor.
///
/// With fewer than [`MIN_DISTINCT_DATES`] dates the output is `horizon_days`
/// zero points starting the day after the last observed date, whatever the
/// model.
///
/// # Errors
///
/// Returns [`ForecastError::EmptySeries`] if `series` has no entries.
pub fn forecast_series(
    forecaster: &dyn Forecaster,
    series: &DailySeries,
    horizon_days: u32,
) -> Result<Vec<ForecastPoint>, ForecastError> {
    let last = series.last().ok_or(ForecastError::EmptySeries)?;

    if series.len() < MIN_DISTINCT_DATES {
        tracing::info!(
            dates = series.len(),
            "not enough distinct dates to forecast; emitting flat zero forecast"
        );
        return Ok(horizon_dates(last.date, horizon_days)
            .map(|date| ForecastPoint {
                date,
                predicted_count: 0.0,
            })
            .collect());
    }

    Ok(forecaster.forecast(series, horizon_days))
}

/// Degraded model: history followed by a straight line from the last count
/// to the historical mean.
///
/// Projected step `k` of `h` is `last + (mean - last) * (k - 1) / (h - 1)`,
/// so the first projected day repeats the last count and the final one lands
/// on the mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackForecaster;

impl Forecaster for FallbackForecaster {
    fn name(&self) -> &'static str {
        "fallback"
    }

    #[allow(clippy::cast_precision_loss)]
    fn forecast(&self, series: &DailySeries, horizon_days: u32) -> Vec<ForecastPoint> {
        let (Some(last), Some(mean)) = (series.last(), series.mean_count()) else {
            return Vec::new();
        };
        let last_count = last.count as f64;
        let steps = horizon_days.saturating_sub(1);

        let projected = horizon_dates(last.date, horizon_days)
            .enumerate()
            .map(|(i, date)| {
                let fraction = if steps == 0 {
                    1.0
                } else {
                    i as f64 / f64::from(steps)
                };
                ForecastPoint {
                    date,
                    predicted_count: last_count + (mean - last_count) * fraction,
                }
            });

        history(series).chain(projected).collect()
    }
}

/// Primary model: least-squares linear trend over the day index plus an
/// additive day-of-week component once the series spans two weeks.
///
/// Output covers every observed date (fitted values) and the horizon.
/// Predictions are floored at zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdditiveForecaster;

struct AdditiveFit {
    origin: NaiveDate,
    intercept: f64,
    slope: f64,
    weekly: [f64; 7],
}

impl AdditiveFit {
    #[allow(clippy::cast_precision_loss)]
    fn predict(&self, date: NaiveDate) -> f64 {
        let x = (date - self.origin).num_days() as f64;
        let seasonal = self.weekly[date.weekday().num_days_from_monday() as usize];
        (self.intercept + self.slope * x + seasonal).max(0.0)
    }
}

impl AdditiveForecaster {
    #[allow(clippy::cast_precision_loss)]
    fn fit(series: &DailySeries) -> Option<AdditiveFit> {
        let origin = series.first()?.date;
        let observations: Vec<(NaiveDate, f64, f64)> = series
            .points()
            .iter()
            .map(|p| (p.date, (p.date - origin).num_days() as f64, p.count as f64))
            .collect();

        let n = observations.len() as f64;
        let mean_x = observations.iter().map(|o| o.1).sum::<f64>() / n;
        let mean_y = observations.iter().map(|o| o.2).sum::<f64>() / n;
        let sxx: f64 = observations.iter().map(|o| (o.1 - mean_x).powi(2)).sum();
        let sxy: f64 = observations
            .iter()
            .map(|o| (o.1 - mean_x) * (o.2 - mean_y))
            .sum();
        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        let intercept = mean_y - slope * mean_x;

        let mut weekly = [0.0_f64; 7];
        let span = (series.last()?.date - origin).num_days();
        if span >= WEEKLY_SEASONALITY_MIN_SPAN_DAYS {
            let mut sums = [0.0_f64; 7];
            let mut counts = [0_u32; 7];
            for (date, x, y) in &observations {
                let day = date.weekday().num_days_from_monday() as usize;
                sums[day] += y - (intercept + slope * x);
                counts[day] += 1;
            }
            let observed: Vec<usize> = (0..7).filter(|&d| counts[d] > 0).collect();
            for &d in &observed {
                weekly[d] = sums[d] / f64::from(counts[d]);
            }
            let centre = observed.iter().map(|&d| weekly[d]).sum::<f64>() / observed.len() as f64;
            for &d in &observed {
                weekly[d] -= centre;
            }
        }

        Some(AdditiveFit {
            origin,
            intercept,
            slope,
            weekly,
        })
    }
}

impl Forecaster for AdditiveForecaster {
    fn name(&self) -> &'static str {
        "additive"
    }

    fn forecast(&self, series: &DailySeries, horizon_days: u32) -> Vec<ForecastPoint> {
        let (Some(fit), Some(last)) = (Self::fit(series), series.last()) else {
            return Vec::new();
        };

        series
            .points()
            .iter()
            .map(|p| p.date)
            .chain(horizon_dates(last.date, horizon_days))
            .map(|date| ForecastPoint {
                date,
                predicted_count: fit.predict(date),
            })
            .collect()
    }
}

/// Counts reported by [`run_forecast`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastReport {
    pub model: &'static str,
    pub observed_dates: usize,
    pub points: usize,
}

/// Run the forecast stage: daily counts from `store`, forecast, overwrite `output`.
///
/// # Errors
///
/// Returns [`ForecastError::Store`] if the store is missing or unreadable or
/// the output cannot be written, and [`ForecastError::EmptySeries`] if the
/// store holds no records. Nothing is written on error.
pub fn run_forecast(
    store: &PostStore,
    output: &ForecastFile,
    forecaster: &dyn Forecaster,
    horizon_days: u32,
) -> Result<ForecastReport, ForecastError> {
    let records = store.load()?;
    let series = daily_counts(&records);
    let points = forecast_series(forecaster, &series, horizon_days)?;
    output.write(&points)?;

    let report = ForecastReport {
        model: forecaster.name(),
        observed_dates: series.len(),
        points: points.len(),
    };
    tracing::info!(
        model = report.model,
        observed_dates = report.observed_dates,
        points = report.points,
        path = %output.path().display(),
        "forecast written"
    );
    Ok(report)
}
