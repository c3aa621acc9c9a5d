use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// Maximum number of characters kept from a post body.
pub const SELFTEXT_MAX_CHARS: usize = 1_000;

/// One ingested forum post.
///
/// `keyword` and `sentiment` are `None` until the enrichment stage has run
/// for this record. The calendar date is always derived from `created_at`
/// and never stored alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub author: String,
    pub url: String,
    /// Forum the post was fetched from.
    pub source_group: String,
    pub score: i64,
    pub num_comments: u64,
    /// Unix timestamp, seconds.
    pub created_at: i64,
    pub keyword: Option<String>,
    /// In `[-1.0, 1.0]` once enriched.
    pub sentiment: Option<f64>,
}

impl PostRecord {
    /// UTC calendar date of `created_at`.
    ///
    /// Timestamps outside chrono's range map to the Unix epoch date.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        DateTime::from_timestamp(self.created_at, 0)
            .unwrap_or_default()
            .date_naive()
    }

    #[must_use]
    pub fn is_enriched(&self) -> bool {
        self.keyword.is_some() && self.sentiment.is_some()
    }

    /// Sentiment with un-enriched records counted as neutral.
    #[must_use]
    pub fn sentiment_or_neutral(&self) -> f64 {
        self.sentiment.unwrap_or(0.0)
    }

    /// Truncate `selftext` to [`SELFTEXT_MAX_CHARS`] characters.
    #[must_use]
    pub fn cap_selftext(text: &str) -> String {
        text.chars().take(SELFTEXT_MAX_CHARS).collect()
    }
}
