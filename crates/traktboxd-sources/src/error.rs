use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    /// Non-2xx response from the upstream service.
    #[error("{status}: {status_text}")]
    Upstream { status: u16, status_text: String },

    /// Transport failure or a body that could not be decoded.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl SourceError {
    pub fn upstream(status: u16, status_text: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            status_text: status_text.into(),
        }
    }

    pub fn from_status(status: StatusCode) -> Self {
        Self::upstream(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status"),
        )
    }

    /// HTTP status behind this error, if the upstream answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}
