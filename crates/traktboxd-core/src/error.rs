use std::path::PathBuf;
use thiserror::Error;
use traktboxd_sources::SourceError;

#[derive(Debug, Error)]
pub enum ExportError {
    /// Upstream failure, passed through unchanged
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to write {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to build archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("export task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ExportError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// HTTP status of the upstream response that aborted the export, if any
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Source(e) => e.status(),
            _ => None,
        }
    }
}
