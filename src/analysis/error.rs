use thiserror::Error;

/// Classifier request errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Response contained no text")]
    EmptyResponse,

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("No API key configured")]
    MissingApiKey,
}
