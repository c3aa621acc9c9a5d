//! Slack delivery for spike alerts.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use trendvision_core::AlertConfig;

use crate::error::AlertError;

const DEFAULT_API_BASE_URL: &str = "https://slack.com";

/// Posts plain-text messages to one Slack channel via `chat.postMessage`.
pub struct SlackNotifier {
    client: reqwest::Client,
    token: String,
    channel: String,
    url: String,
}

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackNotifier {
    /// Build a notifier from config, or `None` when no bot token is set.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AlertConfig, timeout_secs: u64) -> Result<Option<Self>, AlertError> {
        match &config.bot_token {
            Some(token) => Ok(Some(Self::with_base_url(
                token,
                &config.channel,
                timeout_secs,
                DEFAULT_API_BASE_URL,
            )?)),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns [`AlertError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(
        token: &str,
        channel: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AlertError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            token: token.to_string(),
            channel: channel.to_string(),
            url: format!("{}/api/chat.postMessage", base_url.trim_end_matches('/')),
        })
    }

    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Deliver `text` to the configured channel.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Http`] on network failure,
    /// [`AlertError::UnexpectedStatus`] on a non-2xx response, or
    /// [`AlertError::Rejected`] when Slack answers `ok: false`.
    pub async fn send(&self, text: &str) -> Result<(), AlertError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&PostMessage {
                channel: &self.channel,
                text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AlertError::UnexpectedStatus {
                status: response.status().as_u16(),
            });
        }

        let body: SlackResponse = response.json().await?;
        if !body.ok {
            return Err(AlertError::Rejected(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SlackNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackNotifier")
            .field("token", &"[redacted]")
            .field("channel", &self.channel)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
