//! Reddit API client (client-credentials OAuth) producing post records.

use std::collections::HashSet;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::StatusCode;
use serde::Deserialize;
use trendvision_core::{AppConfig, PostRecord, RedditCredentials};

use crate::error::IngestError;
use crate::retry::retry_with_backoff;

const DEFAULT_AUTH_BASE_URL: &str = "https://www.reddit.com";
const DEFAULT_API_BASE_URL: &str = "https://oauth.reddit.com";
/// Largest page the listing endpoints return.
const MAX_PAGE_SIZE: usize = 100;
/// Forum names are `[A-Za-z0-9_]`; anything else is escaped in the path.
const FORUM_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'-');

/// Settings the ingestion stage needs, extracted from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub credentials: RedditCredentials,
    pub user_agent: String,
    pub subreddits: Vec<String>,
    /// Posts per listing (hot, new) per forum.
    pub fetch_limit: usize,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl IngestConfig {
    /// # Errors
    ///
    /// Returns [`IngestError::MissingCredentials`] if forum credentials are not configured.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, IngestError> {
        let credentials = config
            .reddit
            .clone()
            .ok_or(IngestError::MissingCredentials)?;
        Ok(Self {
            credentials,
            user_agent: config.reddit_user_agent.clone(),
            subreddits: config.subreddits.clone(),
            fetch_limit: config.fetch_limit,
            request_timeout_secs: config.request_timeout_secs,
            max_retries: config.max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
        })
    }
}

/// Which listing of a forum to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSort {
    Hot,
    New,
}

impl ListingSort {
    fn as_str(self) -> &'static str {
        match self {
            ListingSort::Hot => "hot",
            ListingSort::New => "new",
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: Option<String>,
    title: Option<String>,
    selftext: Option<String>,
    author: Option<String>,
    url: Option<String>,
    score: Option<i64>,
    num_comments: Option<i64>,
    created_utc: Option<f64>,
}

/// Reddit API client holding a valid access token.
pub struct RedditClient {
    client: reqwest::Client,
    token: String,
    api_base: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl RedditClient {
    /// Exchange client credentials for an access token against the production API.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the HTTP client cannot be built or the token
    /// exchange fails.
    pub async fn connect(config: &IngestConfig) -> Result<Self, IngestError> {
        Self::connect_with_base_urls(config, DEFAULT_AUTH_BASE_URL, DEFAULT_API_BASE_URL).await
    }

    /// Same as [`RedditClient::connect`] with custom endpoints (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the HTTP client cannot be built or the token
    /// exchange fails.
    pub async fn connect_with_base_urls(
        config: &IngestConfig,
        auth_base: &str,
        api_base: &str,
    ) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.clone())
            .build()?;

        let token_url = format!("{}/api/v1/access_token", auth_base.trim_end_matches('/'));
        let token = retry_with_backoff(config.max_retries, config.retry_backoff_base_ms, || {
            fetch_token(&client, &token_url, &config.credentials)
        })
        .await?;

        Ok(Self {
            client,
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        })
    }

    /// Fetch up to `limit` posts from one listing of `subreddit`.
    ///
    /// Pages through the listing with the `after` cursor until `limit` posts
    /// are collected or the listing ends. Posts without an id or creation
    /// time are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if a page request fails after retries.
    pub async fn fetch_listing(
        &self,
        subreddit: &str,
        sort: ListingSort,
        limit: usize,
    ) -> Result<Vec<PostRecord>, IngestError> {
        let url = listing_url(&self.api_base, subreddit, sort);
        let mut after: Option<String> = None;
        let mut posts = Vec::new();

        while posts.len() < limit {
            let page_size = (limit - posts.len()).min(MAX_PAGE_SIZE);
            let mut params: Vec<(&str, String)> = vec![
                ("limit", page_size.to_string()),
                ("raw_json", "1".to_string()),
            ];
            if let Some(cursor) = &after {
                params.push(("after", cursor.clone()));
            }

            let listing = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                self.fetch_page(&url, &params)
            })
            .await?;

            let page_len = listing.data.children.len();
            posts.extend(
                listing
                    .data
                    .children
                    .into_iter()
                    .filter_map(|child| to_record(child.data, subreddit)),
            );

            after = listing.data.after;
            if after.is_none() || page_len == 0 {
                break;
            }
        }

        posts.truncate(limit);
        Ok(posts)
    }

    /// Fetch the hot and new listings of every forum, deduplicated by id.
    ///
    /// A forum that fails is logged and skipped; the result may be empty.
    pub async fn fetch_forums(&self, subreddits: &[String], limit: usize) -> Vec<PostRecord> {
        let mut posts = Vec::new();

        for subreddit in subreddits {
            for sort in [ListingSort::Hot, ListingSort::New] {
                match self.fetch_listing(subreddit, sort, limit).await {
                    Ok(batch) => {
                        tracing::debug!(
                            subreddit = %subreddit,
                            listing = sort.as_str(),
                            count = batch.len(),
                            "fetched listing"
                        );
                        posts.extend(batch);
                    }
                    Err(e) => {
                        tracing::warn!(
                            subreddit = %subreddit,
                            listing = sort.as_str(),
                            error = %e,
                            "could not fetch listing"
                        );
                    }
                }
            }
        }

        let mut seen: HashSet<String> = HashSet::new();
        posts.retain(|post| seen.insert(post.id.clone()));
        posts
    }

    async fn fetch_page(&self, url: &str, params: &[(&str, String)]) -> Result<Listing, IngestError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(0);
            return Err(IngestError::RateLimited {
                url: url.to_string(),
                retry_after_secs,
            });
        }
        if !status.is_success() {
            return Err(IngestError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| IngestError::Deserialize {
            context: format!("listing {url}"),
            source: e,
        })
    }
}

async fn fetch_token(
    client: &reqwest::Client,
    token_url: &str,
    credentials: &RedditCredentials,
) -> Result<String, IngestError> {
    let response = client
        .post(token_url)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    let status = response.status();
    if status.is_server_error() {
        return Err(IngestError::UnexpectedStatus {
            status: status.as_u16(),
            url: token_url.to_string(),
        });
    }
    if !status.is_success() {
        return Err(IngestError::Auth(format!(
            "token endpoint returned status {status}"
        )));
    }

    let body = response.text().await?;
    let token: TokenResponse =
        serde_json::from_str(&body).map_err(|e| IngestError::Auth(format!("token parse error: {e}")))?;
    Ok(token.access_token)
}

fn listing_url(api_base: &str, subreddit: &str, sort: ListingSort) -> String {
    let forum = utf8_percent_encode(subreddit, FORUM_SEGMENT);
    format!("{api_base}/r/{forum}/{}", sort.as_str())
}

fn to_record(data: PostData, subreddit: &str) -> Option<PostRecord> {
    let id = data.id.filter(|id| !id.trim().is_empty())?;
    #[allow(clippy::cast_possible_truncation)]
    let created_at = data.created_utc.filter(|t| t.is_finite())?.trunc() as i64;

    Some(PostRecord {
        id,
        title: data.title.unwrap_or_default(),
        selftext: PostRecord::cap_selftext(&data.selftext.unwrap_or_default()),
        author: data.author.unwrap_or_default(),
        url: data.url.unwrap_or_default(),
        source_group: subreddit.to_string(),
        score: data.score.unwrap_or(0),
        num_comments: data
            .num_comments
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0),
        created_at,
        keyword: None,
        sentiment: None,
    })
}

/// Connect and fetch every configured forum in one call.
///
/// # Errors
///
/// Returns [`IngestError`] if the token exchange fails. Individual forum
/// failures are logged and skipped.
pub async fn collect_posts(config: &IngestConfig) -> Result<Vec<PostRecord>, IngestError> {
    let client = RedditClient::connect(config).await?;
    let posts = client
        .fetch_forums(&config.subreddits, config.fetch_limit)
        .await;
    tracing::info!(
        forums = config.subreddits.len(),
        posts = posts.len(),
        "collected forum posts"
    );
    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_url_escapes_forum_name() {
        assert_eq!(
            listing_url("https://api.test", "rust_gamedev", ListingSort::Hot),
            "https://api.test/r/rust_gamedev/hot"
        );
        assert_eq!(
            listing_url("https://api.test", "a/b?c d", ListingSort::New),
            "https://api.test/r/a%2Fb%3Fc%20d/new"
        );
    }

    fn data(id: Option<&str>, created_utc: Option<f64>) -> PostData {
        PostData {
            id: id.map(ToString::to_string),
            title: Some("A title".to_string()),
            selftext: Some("x".repeat(2_000)),
            author: Some("someone".to_string()),
            url: Some("https://example.com".to_string()),
            score: Some(12),
            num_comments: Some(-1),
            created_utc,
        }
    }

    #[test]
    fn to_record_maps_fields_and_caps_body() {
        let record = to_record(data(Some("abc"), Some(1_700_000_000.9)), "rust").unwrap();
        assert_eq!(record.id, "abc");
        assert_eq!(record.source_group, "rust");
        assert_eq!(record.created_at, 1_700_000_000);
        assert_eq!(record.selftext.chars().count(), trendvision_core::SELFTEXT_MAX_CHARS);
        assert_eq!(record.num_comments, 0);
        assert!(record.keyword.is_none());
    }

    #[test]
    fn to_record_requires_id_and_timestamp() {
        assert!(to_record(data(None, Some(1.0)), "rust").is_none());
        assert!(to_record(data(Some(""), Some(1.0)), "rust").is_none());
        assert!(to_record(data(Some("abc"), None), "rust").is_none());
    }
}
