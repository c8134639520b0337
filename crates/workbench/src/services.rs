//! Contracts of the collaborators the workspace calls.
//!
//! The workspace treats these as black boxes. Calls are made from worker
//! threads, so implementations must be `Send + Sync`.

use std::path::{Path, PathBuf};

use crate::error::ServiceError;

/// Result of a file read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContent {
    pub content: String,
    /// The service cut the content short.
    pub truncated: bool,
    /// The file is not text. `content` is empty in that case.
    pub is_binary: bool,
}

impl FileContent {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            truncated: false,
            is_binary: false,
        }
    }
}

/// Result of a diff request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffContent {
    pub diff: String,
    pub truncated: bool,
}

impl DiffContent {
    pub fn text(diff: impl Into<String>) -> Self {
        Self {
            diff: diff.into(),
            truncated: false,
        }
    }
}

/// Reads and writes workspace files.
///
/// `root` is the workspace path at the time of the request, so one service
/// instance follows the workspace across project resets.
pub trait FileService: Send + Sync {
    fn read(&self, root: &Path, path: &Path) -> Result<FileContent, ServiceError>;
    fn write(&self, root: &Path, path: &Path, content: &str) -> Result<(), ServiceError>;
}

/// Produces git diffs for single files.
pub trait DiffService: Send + Sync {
    /// `staged` selects the index diff instead of the working-tree diff.
    fn diff(&self, root: &Path, file: &Path, staged: bool) -> Result<DiffContent, ServiceError>;
}

/// Project metadata the workspace is seeded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    /// Default terminal cwd, file root and diff root.
    pub workspace_path: PathBuf,
}

impl ProjectContext {
    pub fn new(workspace_path: impl Into<PathBuf>) -> Self {
        Self {
            workspace_path: workspace_path.into(),
        }
    }
}
