//! Enrichment stage orchestration.

use trendvision_core::{AppConfig, PostRecord};
use trendvision_store::PostStore;

use crate::classifier::ClassifierClient;
use crate::error::NlpError;
use crate::keywords::{KeywordExtractor, RakeExtractor};
use crate::outcome::ModelOutcome;
use crate::scorer::{LexiconScorer, SentimentScorer};

/// Per-run counts reported by [`run_enrichment`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    /// Records enriched by this run.
    pub records: usize,
    /// Records that already carried both derived columns and were left as is.
    pub skipped: usize,
    /// Records whose keyword fell back to the empty default.
    pub keyword_defaults: usize,
    /// Records whose final sentiment is the `0.0` default.
    pub sentiment_defaults: usize,
    /// Records where the classifier failed and the lexicon filled in.
    pub classifier_fallbacks: usize,
}

/// Keyword extractor plus sentiment scorer(s) applied to un-enriched records.
pub struct Enricher {
    keywords: Box<dyn KeywordExtractor + Send + Sync>,
    scorer: Box<dyn SentimentScorer + Send + Sync>,
    classifier: Option<ClassifierClient>,
}

impl Enricher {
    pub fn new(
        keywords: Box<dyn KeywordExtractor + Send + Sync>,
        scorer: Box<dyn SentimentScorer + Send + Sync>,
    ) -> Self {
        Self {
            keywords,
            scorer,
            classifier: None,
        }
    }

    /// Use `classifier` as the primary sentiment source; the lexicon scorer
    /// only fills records the classifier could not score.
    #[must_use]
    pub fn with_classifier(mut self, classifier: ClassifierClient) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Default extractor and lexicon scorer, plus the remote classifier when
    /// `USE_TRANSFORMER` is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`NlpError::Http`] if the classifier HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, NlpError> {
        let enricher = Self::new(Box::new(RakeExtractor), Box::new(LexiconScorer));
        match (&config.sentiment_classifier_url, config.use_transformer) {
            (Some(url), true) => Ok(enricher.with_classifier(ClassifierClient::new(
                url,
                config.request_timeout_secs,
            )?)),
            _ => Ok(enricher),
        }
    }

    /// Set `keyword` and `sentiment` from the title on every record that is
    /// not enriched yet.
    ///
    /// Records already carrying both columns are never touched, so a later
    /// classifier outage cannot replace an earlier classifier score. Model
    /// failures never abort: they resolve to an empty keyword or a `0.0`
    /// sentiment.
    pub async fn enrich(&self, records: &mut [PostRecord]) -> EnrichmentReport {
        let total = records.len();
        let mut pending: Vec<&mut PostRecord> =
            records.iter_mut().filter(|r| !r.is_enriched()).collect();
        let mut report = EnrichmentReport {
            records: pending.len(),
            skipped: total - pending.len(),
            ..EnrichmentReport::default()
        };

        let primary = match &self.classifier {
            Some(classifier) if !pending.is_empty() => {
                let titles: Vec<&str> = pending.iter().map(|r| r.title.as_str()).collect();
                Some(classifier.score_all(&titles).await)
            }
            _ => None,
        };

        for (i, record) in pending.iter_mut().enumerate() {
            let keyword = self.keywords.extract(&record.title);
            if keyword.is_default() {
                report.keyword_defaults += 1;
            }

            let sentiment = match primary.as_ref().and_then(|scores| scores.get(i)) {
                Some(ModelOutcome::Value(score)) => ModelOutcome::Value(*score),
                Some(ModelOutcome::Defaulted { .. }) => {
                    report.classifier_fallbacks += 1;
                    self.scorer.score(&record.title)
                }
                None => self.scorer.score(&record.title),
            };
            if sentiment.is_default() {
                report.sentiment_defaults += 1;
            }

            record.keyword = Some(keyword.into_value().trim().to_string());
            record.sentiment = Some(sanitize_sentiment(sentiment.into_value()));
        }

        report
    }
}

fn sanitize_sentiment(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Run the enrichment stage over the store in place.
///
/// 1. Load every record; abort with [`StoreError::MissingInput`] before
///    writing anything if the store file does not exist.
/// 2. Enrich the records that are not enriched yet (see [`Enricher::enrich`]).
/// 3. Rewrite the store atomically with the derived columns.
///
/// # Errors
///
/// Returns [`NlpError::Store`] if the store is missing or cannot be read or
/// written. Per-record model failures are not errors.
///
/// [`StoreError::MissingInput`]: trendvision_store::StoreError::MissingInput
pub async fn run_enrichment(
    store: &PostStore,
    enricher: &Enricher,
) -> Result<EnrichmentReport, NlpError> {
    let mut records = store.load()?;
    let report = enricher.enrich(&mut records).await;
    store.save(&records)?;

    tracing::info!(
        path = %store.path().display(),
        records = report.records,
        skipped = report.skipped,
        keyword_defaults = report.keyword_defaults,
        sentiment_defaults = report.sentiment_defaults,
        classifier_fallbacks = report.classifier_fallbacks,
        "enrichment complete"
    );
    Ok(report)
}
