//! Aggregation, forecasting, and spike monitoring over the TrendVision post store.

pub mod aggregate;
pub mod alert;
pub mod error;
pub mod forecast;
pub mod monitor;

pub use aggregate::{
    compare_keywords, daily_counts, group_stats, keyword_frequency, overview, posts_with_keyword,
    sentiment_histogram, top_keyword, top_keywords, GroupKey, GroupStats, KeywordCount,
    KeywordDailyCount, Overview, SentimentBin,
};
pub use alert::SlackNotifier;
pub use error::{AlertError, ForecastError};
pub use forecast::{
    forecast_series, forecaster_for, run_forecast, AdditiveForecaster, FallbackForecaster,
    ForecastReport, Forecaster,
};
pub use monitor::{detect_spike, run_spike_check, Spike, SpikeAlert, SpikeMonitor};
