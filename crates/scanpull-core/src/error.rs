//! Error taxonomy for a pipeline run.

use std::fmt;
use thiserror::Error;

/// Error returned by a single HTTP fetch (curl failure or HTTP status).
#[derive(Debug)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, DNS, etc.).
    Curl(curl::Error),
    /// Final response status was not 200.
    Http(u32),
    /// Writing the response body to disk failed.
    Storage(std::io::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Curl(e) => write!(f, "{}", e),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
            FetchError::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) => Some(e),
            FetchError::Storage(e) => Some(e),
            FetchError::Http(_) => None,
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Curl(e)
    }
}

/// Which resolution level came up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// Root listing had no dataset folders.
    NoFolders,
    /// Newest folder (and the fallback folder, if any) had no files.
    NoFiles,
    /// File listing had no entry labelled with `udp53`.
    NoUdp53Link,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundReason::NoFolders => write!(f, "no dataset folders"),
            NotFoundReason::NoFiles => write!(f, "no files"),
            NotFoundReason::NoUdp53Link => write!(f, "no udp53 link"),
        }
    }
}

/// Failure that terminates a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("required configuration missing: {0}")]
    ConfigMissing(&'static str),

    #[error("fetch {url} failed: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("not found: {0}")]
    NotFound(NotFoundReason),

    #[error("failed to decompress {path}: {source}")]
    DecompressFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table: {0}")]
    Csv(#[from] csv::Error),
}

impl From<std::io::Error> for PipelineError {
    fn from(source: std::io::Error) -> Self {
        PipelineError::io("file i/o", source)
    }
}

impl PipelineError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        PipelineError::Io {
            context: context.into(),
            source,
        }
    }
}
