//! Data collection for TrendVision.
//!
//! Pulls hot and new posts from the configured forums through the Reddit API
//! (client-credentials OAuth) and looks up recent news headlines for a keyword
//! through Google News RSS.

pub mod error;
pub mod news;
pub mod reddit;

mod retry;

pub use error::IngestError;
pub use news::{NewsClient, NewsItem};
pub use reddit::{collect_posts, IngestConfig, ListingSort, RedditClient};
