//! On-disk row shape of the post store.
//!
//! Every cell is read as an optional string and converted leniently: the file
//! may come from an older run with different column names, float timestamps,
//! or no enrichment columns at all.

use serde::Deserialize;
use trendvision_core::PostRecord;

pub(crate) const BASE_HEADER: [&str; 9] = [
    "id",
    "title",
    "selftext",
    "author",
    "url",
    "source_group",
    "score",
    "num_comments",
    "created_at",
];
pub(crate) const ENRICHMENT_HEADER: [&str; 2] = ["keyword", "sentiment"];

#[derive(Debug, Deserialize)]
pub(crate) struct RawPostRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    selftext: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, alias = "subreddit")]
    source_group: Option<String>,
    #[serde(default)]
    score: Option<String>,
    #[serde(default)]
    num_comments: Option<String>,
    #[serde(default, alias = "created_utc")]
    created_at: Option<String>,
    #[serde(default)]
    keyword: Option<String>,
    #[serde(default)]
    sentiment: Option<String>,
}

/// Which derived columns the file header carries.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DerivedColumns {
    pub keyword: bool,
    pub sentiment: bool,
}

impl DerivedColumns {
    pub(crate) fn from_headers(headers: &csv::StringRecord) -> Self {
        Self {
            keyword: headers.iter().any(|h| h.trim() == "keyword"),
            sentiment: headers.iter().any(|h| h.trim() == "sentiment"),
        }
    }
}

impl RawPostRow {
    /// Convert to a [`PostRecord`], or explain why the row is unusable.
    pub(crate) fn into_record(self, columns: DerivedColumns) -> Result<PostRecord, String> {
        let id = self
            .id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "missing id".to_string())?;

        let created_at = self
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or_else(|| format!("post {id}: missing or invalid created_at"))?;

        // A blank sentiment cell is a row appended after the last enrichment
        // run. Enrichment always writes a number there.
        let sentiment = if columns.sentiment {
            self.sentiment
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(|s| coerce_sentiment(Some(s)))
        } else {
            None
        };
        let keyword = if columns.keyword {
            let keyword = self.keyword.unwrap_or_default().trim().to_string();
            (!keyword.is_empty() || sentiment.is_some()).then_some(keyword)
        } else {
            None
        };

        Ok(PostRecord {
            id,
            title: self.title.unwrap_or_default(),
            selftext: PostRecord::cap_selftext(&self.selftext.unwrap_or_default()),
            author: self.author.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            source_group: self.source_group.unwrap_or_default(),
            score: self.score.as_deref().and_then(parse_integer).unwrap_or(0),
            num_comments: self
                .num_comments
                .as_deref()
                .and_then(parse_integer)
                .and_then(|n| u64::try_from(n).ok())
                .unwrap_or(0),
            created_at,
            keyword,
            sentiment,
        })
    }
}

/// Cells written for one record, in header order.
pub(crate) fn record_fields(record: &PostRecord, with_enrichment: bool) -> Vec<String> {
    let mut fields = vec![
        record.id.clone(),
        record.title.clone(),
        record.selftext.clone(),
        record.author.clone(),
        record.url.clone(),
        record.source_group.clone(),
        record.score.to_string(),
        record.num_comments.to_string(),
        record.created_at.to_string(),
    ];
    if with_enrichment {
        fields.push(record.keyword.clone().unwrap_or_default());
        fields.push(record.sentiment.map(|s| s.to_string()).unwrap_or_default());
    }
    fields
}

/// Parse seconds since the epoch, accepting float notation (`1700000000.0`).
#[allow(clippy::cast_possible_truncation)]
fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return Some(secs);
    }
    let secs = raw.parse::<f64>().ok().filter(|f| f.is_finite())?;
    if secs.abs() > 1e15 {
        return None;
    }
    Some(secs.trunc() as i64)
}

#[allow(clippy::cast_possible_truncation)]
fn parse_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.abs() < 1e15)
            .map(|f| f.trunc() as i64)
    })
}

/// Non-numeric, missing, or NaN sentiment becomes neutral; the rest is
/// clamped to `[-1, 1]`.
pub(crate) fn coerce_sentiment(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|f| f.is_finite())
        .map_or(0.0, |f| f.clamp(-1.0, 1.0))
}
