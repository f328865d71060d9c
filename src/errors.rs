use thiserror::Error;

/// Failure of a live completion call. Never retried internally.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Transport failure, timeout, or a non-success status from the provider.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// The provider answered but the payload did not match the expected shape.
    #[error("could not parse completion: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AnalysisError::Parse(e.to_string())
        } else {
            AnalysisError::Upstream(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(e: serde_json::Error) -> Self {
        AnalysisError::Parse(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("failed to record usage: {0}")]
    Ledger(anyhow::Error),
}

/// Service-level error surfaced to whatever drives the workflows.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Analysis failed: {0}")]
    Analysis(#[from] GatewayError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}
