//! Local implementations of the file and diff services.
//!
//! `LocalFileService` reads and writes beneath the workspace root passed
//! with each call and refuses paths that escape it. `GitCliDiffService` shells out to `git diff`.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

use crate::config::PreviewConfig;
use crate::error::ServiceError;
use crate::services::{DiffContent, DiffService, FileContent, FileService};

// =============================================================================
// LocalFileService
// =============================================================================

/// Filesystem-backed file service confined to the requested root.
#[derive(Debug, Clone)]
pub struct LocalFileService {
    limits: PreviewConfig,
}

impl LocalFileService {
    pub fn new(limits: PreviewConfig) -> Self {
        Self { limits }
    }
}

/// Resolves `path` against `root`, rejecting anything outside it.
fn resolve(root: &Path, path: &Path) -> Result<PathBuf, ServiceError> {
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(ServiceError::OutsideWorkspace(path.to_path_buf()));
    }
    if path.is_absolute() {
        if path.starts_with(root) {
            return Ok(path.to_path_buf());
        }
        return Err(ServiceError::OutsideWorkspace(path.to_path_buf()));
    }
    Ok(root.join(path))
}

impl FileService for LocalFileService {
    fn read(&self, root: &Path, path: &Path) -> Result<FileContent, ServiceError> {
        let full = resolve(root, path)?;
        let file = File::open(&full).map_err(|e| ServiceError::io(&full, e))?;

        let limit = self.limits.max_file_bytes;
        let mut bytes = Vec::new();
        file.take(limit as u64 + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| ServiceError::io(&full, e))?;

        let truncated = bytes.len() > limit;
        bytes.truncate(limit);

        let sniff = bytes.len().min(self.limits.binary_sniff_bytes);
        if bytes[..sniff].contains(&0) {
            tracing::debug!(path = %full.display(), "binary file detected");
            return Ok(FileContent {
                content: String::new(),
                truncated,
                is_binary: true,
            });
        }

        match decode_text(bytes, truncated) {
            Some(content) => Ok(FileContent {
                content,
                truncated,
                is_binary: false,
            }),
            None => Ok(FileContent {
                content: String::new(),
                truncated,
                is_binary: true,
            }),
        }
    }

    fn write(&self, root: &Path, path: &Path, content: &str) -> Result<(), ServiceError> {
        let full = resolve(root, path)?;
        fs::write(&full, content).map_err(|e| ServiceError::io(&full, e))?;
        tracing::info!(path = %full.display(), bytes = content.len(), "file written");
        Ok(())
    }
}

/// Decodes UTF-8, tolerating a multi-byte sequence cut by truncation.
fn decode_text(mut bytes: Vec<u8>, truncated: bool) -> Option<String> {
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(err) => {
            let utf8 = err.utf8_error();
            if truncated && utf8.error_len().is_none() {
                bytes = err.into_bytes();
                bytes.truncate(utf8.valid_up_to());
                String::from_utf8(bytes).ok()
            } else {
                None
            }
        }
    }
}

// =============================================================================
// GitCliDiffService
// =============================================================================

/// Runs `git diff [--cached] -- <file>` in the workspace root.
#[derive(Debug, Clone)]
pub struct GitCliDiffService {
    max_diff_bytes: usize,
}

impl GitCliDiffService {
    pub fn new(limits: &PreviewConfig) -> Self {
        Self {
            max_diff_bytes: limits.max_diff_bytes,
        }
    }
}

impl DiffService for GitCliDiffService {
    fn diff(&self, root: &Path, file: &Path, staged: bool) -> Result<DiffContent, ServiceError> {
        let mut command = Command::new("git");
        command.current_dir(root).args(["diff", "--no-color", "--no-ext-diff"]);
        if staged {
            command.arg("--cached");
        }
        command.arg("--").arg(file);

        let output = command.output().map_err(|e| ServiceError::Git(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ServiceError::Git(stderr));
        }

        let mut diff = String::from_utf8_lossy(&output.stdout).into_owned();
        let truncated = diff.len() > self.max_diff_bytes;
        if truncated {
            let mut cut = self.max_diff_bytes;
            while !diff.is_char_boundary(cut) {
                cut -= 1;
            }
            diff.truncate(cut);
        }
        Ok(DiffContent { diff, truncated })
    }
}
