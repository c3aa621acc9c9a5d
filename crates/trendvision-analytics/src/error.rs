use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error(transparent)]
    Store(#[from] trendvision_store::StoreError),

    #[error("no dated posts to forecast from; run ingestion first")]
    EmptySeries,
}

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("alert endpoint returned status {status}")]
    UnexpectedStatus { status: u16 },

    #[error("alert rejected: {0}")]
    Rejected(String),
}
