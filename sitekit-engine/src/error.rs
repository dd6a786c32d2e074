//! Error types for sitekit-engine.

use std::path::PathBuf;

use sitekit_core::GatewayError;
use thiserror::Error;

/// Failures that end a workflow turn.
///
/// Missing input is never one of these; the engine answers it with a prompt.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A remote call failed. Shown as-is; the engine never retries.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Reading, listing or writing a settings file failed.
    #[error(transparent)]
    File(#[from] FileError),

    /// An import or validate source file does not hold JSON.
    #[error("settings file {file} is not valid JSON: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// A fetched payload could not be rendered for export.
    #[error("failed to encode exported settings: {0}")]
    Encode(#[source] serde_json::Error),

    /// The partner ID matched nothing visible to these credentials.
    #[error("partner {0} was not found or is not accessible with these credentials")]
    PartnerNotFound(String),
}

/// Settings-file I/O failures.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data URI: {0}")]
    DataUri(String),
}

/// Convenience constructor for [`FileError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> FileError {
    FileError::Io {
        path: path.into(),
        source,
    }
}
