use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned by the pipeline, its sources and its sinks.
///
/// Per-record problems (blank names, unparsable numbers, malformed rows) never show up here; they
/// are absorbed by defaults or silent rejection. Only structural I/O failures surface.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input or output file could not be opened.
    #[error("failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Underlying I/O error while reading or appending.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error that could not be skipped.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl PipelineError {
    pub(crate) fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }
}
