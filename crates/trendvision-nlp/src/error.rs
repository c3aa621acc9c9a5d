use thiserror::Error;

#[derive(Debug, Error)]
pub enum NlpError {
    #[error(transparent)]
    Store(#[from] trendvision_store::StoreError),

    #[error("classifier error: {0}")]
    Classifier(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
