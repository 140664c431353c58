//! Error taxonomy for an export run. Every failure is fatal; the kind only tells which phase broke.

use std::path::PathBuf;
use thiserror::Error;

/// Broad class of a [`DumpError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad options, CA file, or nothing to export.
    Config,
    /// Connection failure or non-success HTTP status.
    Transport,
    /// Response body is not JSON or lacks the expected fields.
    Protocol,
    /// Output file exists or cannot be opened/written.
    Resource,
}

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("nothing to dump: index {0} has no documents")]
    EmptyIndex(String),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    Protocol(String),

    #[error("output file {} already exists", .0.display())]
    OutputExists(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sink writer stopped before the paginator finished")]
    SinkGone,
}

impl DumpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DumpError::Config(_) | DumpError::EmptyIndex(_) => ErrorKind::Config,
            DumpError::Request { .. } | DumpError::Status { .. } => ErrorKind::Transport,
            DumpError::Json(_) | DumpError::Protocol(_) => ErrorKind::Protocol,
            DumpError::OutputExists(_) | DumpError::Io { .. } | DumpError::SinkGone => {
                ErrorKind::Resource
            }
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        DumpError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Find the [`DumpError`] inside an `anyhow` chain, if any.
pub fn dump_error(err: &anyhow::Error) -> Option<&DumpError> {
    err.chain().find_map(|e| e.downcast_ref::<DumpError>())
}
