//! Remote text-classification client (the higher-cost sentiment mode).
//!
//! Talks to a Text Embeddings Inference style `/predict` endpoint serving a
//! binary sentiment model with `POSITIVE` / `NEGATIVE` labels.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::NlpError;
use crate::outcome::{DefaultReason, ModelOutcome};

/// Maximum number of texts per /predict call.
const BATCH_SIZE: usize = 32;
/// Characters of each text sent to the model.
const MAX_INPUT_CHARS: usize = 512;

/// Classifier HTTP client.
pub struct ClassifierClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: &'a [String],
    truncate: bool,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    label: String,
    score: f64,
}

impl ClassifierClient {
    /// # Errors
    ///
    /// Returns [`NlpError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, NlpError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/predict", base_url.trim_end_matches('/')),
        })
    }

    /// Score every text, one outcome per input in the same order.
    ///
    /// Empty texts default to `0.0` without a request. A failed batch
    /// defaults every text in it; later batches are still attempted.
    pub async fn score_all(&self, texts: &[&str]) -> Vec<ModelOutcome<f64>> {
        let mut outcomes: Vec<Option<ModelOutcome<f64>>> = texts
            .iter()
            .map(|t| {
                t.trim()
                    .is_empty()
                    .then(|| ModelOutcome::defaulted(0.0, DefaultReason::EmptyInput))
            })
            .collect();

        let pending: Vec<usize> = outcomes
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.is_none().then_some(i))
            .collect();

        for chunk in pending.chunks(BATCH_SIZE) {
            let inputs: Vec<String> = chunk
                .iter()
                .map(|&i| texts[i].chars().take(MAX_INPUT_CHARS).collect())
                .collect();

            match self.predict(&inputs).await {
                Ok(scores) => {
                    for (&i, score) in chunk.iter().zip(scores) {
                        outcomes[i] = Some(ModelOutcome::Value(score));
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        batch = chunk.len(),
                        error = %e,
                        "sentiment classifier batch failed; scores defaulted"
                    );
                    for &i in chunk {
                        outcomes[i] = Some(ModelOutcome::defaulted(
                            0.0,
                            DefaultReason::ModelError(e.to_string()),
                        ));
                    }
                }
            }
        }

        outcomes
            .into_iter()
            .map(|o| o.unwrap_or_else(|| ModelOutcome::defaulted(0.0, DefaultReason::EmptyInput)))
            .collect()
    }

    async fn predict(&self, inputs: &[String]) -> Result<Vec<f64>, NlpError> {
        let request = PredictRequest {
            inputs,
            truncate: true,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| NlpError::Classifier(format!("classifier request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(NlpError::Classifier(format!(
                "classifier returned status {}",
                response.status()
            )));
        }

        let predictions: Vec<Vec<Prediction>> = response
            .json()
            .await
            .map_err(|e| NlpError::Classifier(format!("classifier response parse error: {e}")))?;

        if predictions.len() != inputs.len() {
            return Err(NlpError::Classifier(format!(
                "classifier returned {} predictions for {} inputs",
                predictions.len(),
                inputs.len()
            )));
        }

        Ok(predictions.iter().map(|p| signed_score(p)).collect())
    }
}

/// Collapse label probabilities into a signed score: the most likely label's
/// probability, negated for `NEGATIVE`, zero for any other label.
fn signed_score(predictions: &[Prediction]) -> f64 {
    let Some(top) = predictions
        .iter()
        .filter(|p| p.score.is_finite())
        .max_by(|a, b| a.score.total_cmp(&b.score))
    else {
        return 0.0;
    };

    let score = top.score.clamp(0.0, 1.0);
    match top.label.to_ascii_uppercase().as_str() {
        "POSITIVE" => score,
        "NEGATIVE" => -score,
        _ => 0.0,
    }
}
