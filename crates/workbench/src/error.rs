//! Error types for the services the workspace calls.
//!
//! None of these ever cross the tab/view state machine: the reducer turns
//! them into a message stored on the cache entry that owns the request.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a file or diff service call.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(PathBuf),
    #[error("{0} is outside the workspace")]
    OutsideWorkspace(PathBuf),
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("git diff failed: {0}")]
    Git(String),
    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            ServiceError::NotFound(path)
        } else {
            ServiceError::Io { path, source }
        }
    }
}
