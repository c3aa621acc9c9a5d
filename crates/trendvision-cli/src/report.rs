//! Read-only reporting commands: summary and news.

use std::fmt::Write as _;

use trendvision_analytics::{group_stats, overview, top_keyword, GroupKey, GroupStats, Overview};
use trendvision_core::AppConfig;
use trendvision_ingest::{NewsClient, NewsItem};
use trendvision_store::PostStore;

/// Print headline numbers and per-forum statistics.
///
/// A missing store prints an empty summary.
///
/// # Errors
///
/// Returns an error if the store exists but cannot be read.
pub(crate) fn run_summary(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let store = PostStore::new(config.posts_path());
    let records = store.load_or_empty()?;
    let view = overview(&records);
    let groups = group_stats(&records, GroupKey::SourceGroup);

    if json {
        let body = serde_json::json!({ "overview": view, "groups": groups });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print!("{}", render_summary(&view, &groups));
    }
    Ok(())
}

pub(crate) fn render_summary(view: &Overview, groups: &[GroupStats]) -> String {
    let mut out = String::new();
    let last_updated = view
        .last_updated
        .map_or_else(|| "never".to_string(), |d| d.to_string());

    let _ = writeln!(out, "posts:          {}", view.total_posts);
    let _ = writeln!(out, "mean sentiment: {:.3}", view.mean_sentiment);
    let _ = writeln!(out, "top keyword:    {}", view.top_keyword);
    let _ = writeln!(out, "last updated:   {last_updated}");

    if !groups.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<24} {:>6} {:>10} {:>10} {:>10}",
            "forum", "posts", "score", "comments", "sentiment"
        );
        for g in groups {
            let _ = writeln!(
                out,
                "{:<24} {:>6} {:>10.1} {:>10.1} {:>10.3}",
                g.group, g.count, g.mean_score, g.mean_comments, g.mean_sentiment
            );
        }
    }
    out
}

/// Print news headlines for `keyword`, or for the store's top keyword.
///
/// # Errors
///
/// Returns an error if no keyword is given and the store has none, or the
/// news feed cannot be fetched.
pub(crate) async fn run_news(config: &AppConfig, keyword: Option<&str>) -> anyhow::Result<()> {
    let keyword = match keyword.map(str::trim).filter(|k| !k.is_empty()) {
        Some(k) => k.to_string(),
        None => {
            let records = PostStore::new(config.posts_path()).load_or_empty()?;
            top_keyword(&records).ok_or_else(|| {
                anyhow::anyhow!("no keyword given and the store has no enriched posts; pass --keyword")
            })?
        }
    };

    let client = NewsClient::new(config.request_timeout_secs)?;
    let items = client.headlines(&keyword).await?;
    print!("{}", render_headlines(&keyword, &items));
    Ok(())
}

pub(crate) fn render_headlines(keyword: &str, items: &[NewsItem]) -> String {
    let mut out = String::new();
    if items.is_empty() {
        let _ = writeln!(out, "no headlines for '{keyword}'");
        return out;
    }
    let _ = writeln!(out, "headlines for '{keyword}':");
    for item in items {
        let source = if item.source.is_empty() {
            String::new()
        } else {
            format!(" ({})", item.source)
        };
        let _ = writeln!(out, "- {}{source}", item.title);
        let _ = writeln!(out, "  {}", item.link);
    }
    out
}
