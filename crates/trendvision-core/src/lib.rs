//! Shared domain types and configuration for TrendVision.

pub mod app_config;
pub mod config;
pub mod posts;
pub mod series;

pub use app_config::{AlertConfig, AppConfig, ForecastModel, RedditCredentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use posts::{PostRecord, SELFTEXT_MAX_CHARS};
pub use series::{DailyCount, DailySeries, ForecastPoint};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
