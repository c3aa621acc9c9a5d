use crate::app_config::{AlertConfig, AppConfig, ForecastModel, RedditCredentials};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default or is optional: stages that need a credential
/// check for it themselves, so `summary` or `forecast` work without forum keys.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let data_dir = PathBuf::from(or_default("TRENDVISION_DATA_DIR", "./data"));
    let log_level = or_default("TRENDVISION_LOG_LEVEL", "info");
    let bind_addr = or_default("TRENDVISION_BIND_ADDR", "0.0.0.0:8501")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("TRENDVISION_BIND_ADDR", e.to_string()))?;

    let reddit = match (optional("REDDIT_CLIENT_ID"), optional("REDDIT_CLIENT_SECRET")) {
        (Some(client_id), Some(client_secret)) => Some(RedditCredentials {
            client_id,
            client_secret,
        }),
        _ => None,
    };
    let reddit_user_agent = or_default("REDDIT_USER_AGENT", "TrendVision/1.0");
    let subreddits = parse_subreddits(&or_default("SUBREDDITS", "technology"));
    if subreddits.is_empty() {
        return Err(invalid("SUBREDDITS", "no forum names given".to_string()));
    }

    let fetch_limit = parse_usize("TRENDVISION_FETCH_LIMIT", "50")?;
    let request_timeout_secs = parse_u64("TRENDVISION_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("TRENDVISION_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("TRENDVISION_RETRY_BACKOFF_BASE_MS", "1000")?;

    let use_transformer = parse_flag(&or_default("USE_TRANSFORMER", "false"));
    let sentiment_classifier_url =
        optional("SENTIMENT_CLASSIFIER_URL").map(|u| u.trim_end_matches('/').to_string());
    if use_transformer && sentiment_classifier_url.is_none() {
        return Err(ConfigError::MissingEnvVar(
            "SENTIMENT_CLASSIFIER_URL".to_string(),
        ));
    }

    let forecast_model = parse_forecast_model(&or_default("TRENDVISION_FORECAST_MODEL", "additive"))?;
    let forecast_horizon_days = parse_u32("TRENDVISION_FORECAST_HORIZON_DAYS", "7")?;
    if forecast_horizon_days == 0 {
        return Err(invalid(
            "TRENDVISION_FORECAST_HORIZON_DAYS",
            "must be at least 1".to_string(),
        ));
    }

    let spike_multiplier = or_default("TRENDVISION_SPIKE_MULTIPLIER", "3")
        .parse::<f64>()
        .map_err(|e| invalid("TRENDVISION_SPIKE_MULTIPLIER", e.to_string()))?;
    if !spike_multiplier.is_finite() || spike_multiplier <= 0.0 {
        return Err(invalid(
            "TRENDVISION_SPIKE_MULTIPLIER",
            "must be a positive number".to_string(),
        ));
    }

    let alert = AlertConfig {
        bot_token: optional("SLACK_BOT_TOKEN"),
        channel: or_default("SLACK_CHANNEL", "#general"),
        spike_multiplier,
    };

    Ok(AppConfig {
        data_dir,
        log_level,
        bind_addr,
        reddit,
        reddit_user_agent,
        subreddits,
        fetch_limit,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        use_transformer,
        sentiment_classifier_url,
        forecast_model,
        forecast_horizon_days,
        alert,
    })
}

fn parse_subreddits(raw: &str) -> Vec<String> {
    raw.split('+')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes")
}

fn parse_forecast_model(raw: &str) -> Result<ForecastModel, ConfigError> {
    match raw.to_lowercase().as_str() {
        "additive" => Ok(ForecastModel::Additive),
        "fallback" => Ok(ForecastModel::Fallback),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TRENDVISION_FORECAST_MODEL".to_string(),
            reason: format!("unknown model '{other}', expected 'additive' or 'fallback'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
