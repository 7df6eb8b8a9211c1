//! Error types for resource fetches

use thiserror::Error;

/// Failure of a single request. Only the `Display` text reaches fetch state.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },

    #[error("{0}")]
    Network(String),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Superseded by a newer request or torn down; never surfaced
    #[error("request cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}
