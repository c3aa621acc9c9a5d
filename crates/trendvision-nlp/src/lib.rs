//! Keyword and sentiment enrichment for TrendVision post records.
//!
//! Each record gets a dominant keyword extracted from its title and a
//! sentiment score in `[-1.0, 1.0]`. Individual model failures never abort
//! the stage: they resolve to a documented default carried in
//! [`ModelOutcome`].

pub mod classifier;
pub mod enrich;
pub mod error;
pub mod keywords;
pub mod outcome;
pub mod scorer;

pub use classifier::ClassifierClient;
pub use enrich::{run_enrichment, EnrichmentReport, Enricher};
pub use error::NlpError;
pub use keywords::{KeywordExtractor, RakeExtractor};
pub use outcome::{DefaultReason, ModelOutcome};
pub use scorer::{lexicon_score, LexiconScorer, SentimentScorer};
