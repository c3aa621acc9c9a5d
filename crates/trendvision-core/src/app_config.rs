use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// File name of the post record store inside the data directory.
pub const POSTS_FILE: &str = "reddit_posts.csv";
/// File name of the forecast output inside the data directory.
pub const FORECAST_FILE: &str = "forecast.csv";

/// Which forecasting implementation the forecast stage runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastModel {
    /// Additive trend + weekly seasonality model.
    Additive,
    /// Linear interpolation toward the historical mean.
    Fallback,
}

impl std::fmt::Display for ForecastModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastModel::Additive => write!(f, "additive"),
            ForecastModel::Fallback => write!(f, "fallback"),
        }
    }
}

/// Client-credentials pair for the forum API.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .finish()
    }
}

/// Alert delivery destination. `bot_token` absent means delivery is skipped.
#[derive(Clone)]
pub struct AlertConfig {
    pub bot_token: Option<String>,
    pub channel: String,
    pub spike_multiplier: f64,
}

impl std::fmt::Debug for AlertConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[redacted]"))
            .field("channel", &self.channel)
            .field("spike_multiplier", &self.spike_multiplier)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub bind_addr: SocketAddr,
    pub reddit: Option<RedditCredentials>,
    pub reddit_user_agent: String,
    pub subreddits: Vec<String>,
    pub fetch_limit: usize,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub use_transformer: bool,
    pub sentiment_classifier_url: Option<String>,
    pub forecast_model: ForecastModel,
    pub forecast_horizon_days: u32,
    pub alert: AlertConfig,
}

impl AppConfig {
    #[must_use]
    pub fn posts_path(&self) -> PathBuf {
        self.data_dir.join(POSTS_FILE)
    }

    #[must_use]
    pub fn forecast_path(&self) -> PathBuf {
        self.data_dir.join(FORECAST_FILE)
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
