//! Pure derived views over the post store.
//!
//! Nothing here touches the filesystem; callers load records through
//! `trendvision_store::PostStore` and pass them in.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use trendvision_core::{DailySeries, PostRecord};

/// Reported in place of a top keyword when no record has one.
pub const NO_KEYWORD: &str = "N/A";

/// Post count per calendar date, ascending, no zero-fill.
#[must_use]
pub fn daily_counts(records: &[PostRecord]) -> DailySeries {
    DailySeries::from_counts(records.iter().map(|r| (r.date(), 1)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// Count of records per non-empty keyword, in first-encountered order.
///
/// Records without a keyword, or with an empty one, are not counted.
#[must_use]
pub fn keyword_frequency(records: &[PostRecord]) -> Vec<KeywordCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<KeywordCount> = Vec::new();

    for keyword in records
        .iter()
        .filter_map(|r| r.keyword.as_deref())
        .map(str::trim)
        .filter(|k| !k.is_empty())
    {
        match index.get(keyword) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(keyword, counts.len());
                counts.push(KeywordCount {
                    keyword: keyword.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts
}

/// The most frequent keyword; ties go to the keyword seen first.
#[must_use]
pub fn top_keyword(records: &[PostRecord]) -> Option<String> {
    top_keywords(records, 1).into_iter().next().map(|k| k.keyword)
}

/// The `n` most frequent keywords, highest count first.
///
/// Equal counts keep first-encountered order.
#[must_use]
pub fn top_keywords(records: &[PostRecord], n: usize) -> Vec<KeywordCount> {
    let mut counts = keyword_frequency(records);
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(n);
    counts
}

/// Column used to bucket records in [`group_stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupKey {
    #[default]
    SourceGroup,
    Keyword,
    Author,
}

impl GroupKey {
    fn value<'a>(self, record: &'a PostRecord) -> Option<&'a str> {
        let raw = match self {
            GroupKey::SourceGroup => record.source_group.as_str(),
            GroupKey::Keyword => record.keyword.as_deref()?,
            GroupKey::Author => record.author.as_str(),
        };
        Some(raw.trim()).filter(|v| !v.is_empty())
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GroupKey::SourceGroup => "source_group",
            GroupKey::Keyword => "keyword",
            GroupKey::Author => "author",
        })
    }
}

impl FromStr for GroupKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "source_group" | "subreddit" | "forum" => Ok(GroupKey::SourceGroup),
            "keyword" => Ok(GroupKey::Keyword),
            "author" => Ok(GroupKey::Author),
            other => Err(format!(
                "unknown group key '{other}' (expected source_group, keyword, or author)"
            )),
        }
    }
}

/// Per-group counts and means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub group: String,
    pub count: usize,
    pub mean_score: f64,
    pub mean_comments: f64,
    pub mean_sentiment: f64,
}

#[derive(Default)]
struct GroupTotals {
    count: usize,
    score: f64,
    comments: f64,
    sentiment: f64,
}

/// Count and mean score, comments, and sentiment per distinct `key` value,
/// ordered by group name.
///
/// Records with no value for `key` are left out. Missing sentiment counts
/// as `0.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn group_stats(records: &[PostRecord], key: GroupKey) -> Vec<GroupStats> {
    let mut groups: BTreeMap<&str, GroupTotals> = BTreeMap::new();
    for record in records {
        let Some(group) = key.value(record) else {
            continue;
        };
        let totals = groups.entry(group).or_default();
        totals.count += 1;
        totals.score += record.score as f64;
        totals.comments += record.num_comments as f64;
        totals.sentiment += record.sentiment_or_neutral();
    }

    groups
        .into_iter()
        .map(|(group, t)| {
            let n = t.count as f64;
            GroupStats {
                group: group.to_string(),
                count: t.count,
                mean_score: t.score / n,
                mean_comments: t.comments / n,
                mean_sentiment: t.sentiment / n,
            }
        })
        .collect()
}

/// Headline numbers for the whole store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_posts: usize,
    pub mean_sentiment: f64,
    /// Most frequent keyword, or [`NO_KEYWORD`].
    pub top_keyword: String,
    pub source_groups: usize,
    /// Date of the newest post.
    pub last_updated: Option<NaiveDate>,
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn overview(records: &[PostRecord]) -> Overview {
    let mean_sentiment = if records.is_empty() {
        0.0
    } else {
        records.iter().map(PostRecord::sentiment_or_neutral).sum::<f64>() / records.len() as f64
    };

    Overview {
        total_posts: records.len(),
        mean_sentiment,
        top_keyword: top_keyword(records).unwrap_or_else(|| NO_KEYWORD.to_string()),
        source_groups: group_stats(records, GroupKey::SourceGroup).len(),
        last_updated: records.iter().map(PostRecord::date).max(),
    }
}

/// One fixed-width bucket of the sentiment histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Histogram of sentiment over `bins` equal-width buckets spanning `[-1, 1]`.
///
/// Buckets are half-open except the last, which includes `1.0`. `bins` is
/// raised to at least 1.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn sentiment_histogram(records: &[PostRecord], bins: usize) -> Vec<SentimentBin> {
    let bins = bins.max(1);
    let width = 2.0 / bins as f64;
    let mut histogram: Vec<SentimentBin> = (0..bins)
        .map(|i| SentimentBin {
            lower: -1.0 + i as f64 * width,
            upper: -1.0 + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();

    for sentiment in records.iter().map(PostRecord::sentiment_or_neutral) {
        let clamped = sentiment.clamp(-1.0, 1.0);
        let slot = (((clamped + 1.0) / width).floor() as usize).min(bins - 1);
        histogram[slot].count += 1;
    }

    histogram
}

/// Records whose keyword equals `keyword` (case-insensitive), newest first,
/// at most `limit`. `None` selects every record.
#[must_use]
pub fn posts_with_keyword<'a>(
    records: &'a [PostRecord],
    keyword: Option<&str>,
    limit: usize,
) -> Vec<&'a PostRecord> {
    let wanted = keyword.map(|k| k.trim().to_lowercase());
    let mut selected: Vec<&PostRecord> = records
        .iter()
        .filter(|r| match &wanted {
            Some(k) => r
                .keyword
                .as_deref()
                .is_some_and(|rk| rk.trim().to_lowercase() == *k),
            None => true,
        })
        .collect();
    selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    selected.truncate(limit);
    selected
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordDailyCount {
    pub date: NaiveDate,
    pub keyword: String,
    pub count: usize,
}

/// Daily post counts for two keywords side by side, ordered by date then
/// keyword. Dates where a keyword has no posts are absent for it.
#[must_use]
pub fn compare_keywords(records: &[PostRecord], a: &str, b: &str) -> Vec<KeywordDailyCount> {
    let mut counts: BTreeMap<(NaiveDate, &str), usize> = BTreeMap::new();
    for record in records {
        let Some(keyword) = record.keyword.as_deref().map(str::trim) else {
            continue;
        };
        if keyword.is_empty() || (keyword != a.trim() && keyword != b.trim()) {
            continue;
        }
        *counts.entry((record.date(), keyword)).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|((date, keyword), count)| KeywordDailyCount {
            date,
            keyword: keyword.to_string(),
            count,
        })
        .collect()
}
