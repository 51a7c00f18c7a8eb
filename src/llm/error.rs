use std::time::Duration;

use thiserror::Error;

use super::parse::ParseError;

/// Failures of an external generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Credentials for the provider are not configured.
    #[error("{0} is not set")]
    MissingCredentials(&'static str),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response format: {0}")]
    Malformed(String),

    #[error("Invalid response format: {0}")]
    Parse(#[from] ParseError),

    #[error("Model returned no {0}")]
    Empty(&'static str),
}

impl GenerationError {
    /// Whether another attempt may succeed.
    ///
    /// Transport failures, timeouts, rate limiting and server errors are
    /// transient; bad payloads and missing credentials are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_decode() && !e.is_builder(),
            Self::Timeout(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::MissingCredentials(_) | Self::Malformed(_) | Self::Parse(_) | Self::Empty(_) => {
                false
            }
        }
    }
}

pub type GenerationResult<T> = Result<T, GenerationError>;
