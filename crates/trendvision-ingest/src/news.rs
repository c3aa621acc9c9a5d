//! Google News RSS headlines for a trending keyword.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;

use crate::error::IngestError;

const DEFAULT_BASE_URL: &str = "https://news.google.com";
/// Headlines returned per keyword.
pub const MAX_HEADLINES: usize = 8;

/// One news headline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub published: String,
    pub source: String,
}

pub struct NewsClient {
    client: reqwest::Client,
    base_url: String,
}

impl NewsClient {
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: u64) -> Result<Self, IngestError> {
        Self::with_base_url(timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(timeout_secs: u64, base_url: &str) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search Google News for `keyword` and return up to [`MAX_HEADLINES`] items.
    ///
    /// A blank keyword returns no items without making a request.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] on network failure,
    /// [`IngestError::UnexpectedStatus`] on a non-2xx response, or
    /// [`IngestError::Xml`] on malformed RSS.
    pub async fn headlines(&self, keyword: &str) -> Result<Vec<NewsItem>, IngestError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }

        let encoded = utf8_percent_encode(keyword, NON_ALPHANUMERIC).to_string();
        let url = format!(
            "{}/rss/search?q={encoded}&hl=en-US&gl=US&ceid=US:en",
            self.base_url
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(IngestError::UnexpectedStatus {
                status: response.status().as_u16(),
                url,
            });
        }
        let body = response.text().await?;
        let items = parse_news_feed(&body, MAX_HEADLINES)?;
        tracing::debug!(keyword, count = items.len(), "fetched news headlines");
        Ok(items)
    }
}

/// Parse an RSS feed into [`NewsItem`]s, stopping after `max_items`.
///
/// Items without a title or link are skipped.
///
/// # Errors
///
/// Returns [`IngestError::Xml`] if the XML is malformed.
pub fn parse_news_feed(xml: &str, max_items: usize) -> Result<Vec<NewsItem>, IngestError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut in_item = false;
    let mut current_tag = String::new();
    let mut current = NewsItem {
        title: String::new(),
        link: String::new(),
        published: String::new(),
        source: String::new(),
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                if name == "item" {
                    in_item = true;
                    current.title.clear();
                    current.link.clear();
                    current.published.clear();
                    current.source.clear();
                }
                current_tag = name;
            }
            Ok(Event::End(e)) => {
                let raw = e.name();
                let name = std::str::from_utf8(raw.as_ref()).unwrap_or("");
                if name == "item" && in_item {
                    in_item = false;
                    if !current.title.is_empty() && !current.link.is_empty() {
                        items.push(current.clone());
                        if items.len() >= max_items {
                            break;
                        }
                    }
                }
                current_tag.clear();
            }
            Ok(Event::Text(e)) => {
                if in_item {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    assign_field(&mut current, &current_tag, text);
                }
            }
            Ok(Event::CData(e)) => {
                if in_item {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    assign_field(&mut current, &current_tag, text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(IngestError::Xml(e)),
            _ => {}
        }
    }

    Ok(items)
}

fn assign_field(item: &mut NewsItem, tag: &str, text: String) {
    match tag {
        "title" => item.title = text,
        "link" => item.link = text,
        "pubDate" => item.published = text,
        "source" => item.source = text,
        _ => {}
    }
}
