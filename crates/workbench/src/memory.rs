//! In-memory file and diff services.
//!
//! Used by headless hosts and tests. Both services count calls and can be
//! scripted to fail.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::ServiceError;
use crate::services::{DiffContent, DiffService, FileContent, FileService};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// MemoryFileService
// =============================================================================

#[derive(Debug, Default)]
struct FileState {
    files: HashMap<PathBuf, FileContent>,
    read_failures: HashMap<PathBuf, String>,
    write_failure: Option<String>,
    /// `(root, path)` of every read.
    reads: Vec<(PathBuf, PathBuf)>,
    writes: Vec<(PathBuf, String)>,
}

/// Files held in a map keyed by workspace-relative path. The root passed to
/// each call is recorded but does not affect the lookup.
#[derive(Debug, Default)]
pub struct MemoryFileService {
    state: Mutex<FileState>,
}

impl MemoryFileService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a text file.
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, FileContent::text(content));
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: FileContent) {
        lock(&self.state).files.insert(path.into(), content);
    }

    /// Makes every read of `path` fail until [`Self::clear_read_failure`].
    pub fn fail_reads(&self, path: impl Into<PathBuf>, message: impl Into<String>) {
        lock(&self.state).read_failures.insert(path.into(), message.into());
    }

    pub fn clear_read_failure(&self, path: &Path) {
        lock(&self.state).read_failures.remove(path);
    }

    /// Makes the next write fail.
    pub fn fail_next_write(&self, message: impl Into<String>) {
        lock(&self.state).write_failure = Some(message.into());
    }

    /// Number of reads of `path` so far.
    pub fn read_calls(&self, path: &Path) -> usize {
        lock(&self.state).reads.iter().filter(|(_, p)| p.as_path() == path).count()
    }

    /// Roots the reads of `path` were issued against, in order.
    pub fn read_roots(&self, path: &Path) -> Vec<PathBuf> {
        lock(&self.state)
            .reads
            .iter()
            .filter(|(_, p)| p.as_path() == path)
            .map(|(root, _)| root.clone())
            .collect()
    }

    pub fn total_reads(&self) -> usize {
        lock(&self.state).reads.len()
    }

    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        lock(&self.state).writes.clone()
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        lock(&self.state).files.get(path).map(|file| file.content.clone())
    }
}

impl FileService for MemoryFileService {
    fn read(&self, root: &Path, path: &Path) -> Result<FileContent, ServiceError> {
        let mut state = lock(&self.state);
        state.reads.push((root.to_path_buf(), path.to_path_buf()));
        if let Some(message) = state.read_failures.get(path) {
            return Err(ServiceError::Other(message.clone()));
        }
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(path.to_path_buf()))
    }

    fn write(&self, _root: &Path, path: &Path, content: &str) -> Result<(), ServiceError> {
        let mut state = lock(&self.state);
        state.writes.push((path.to_path_buf(), content.to_string()));
        if let Some(message) = state.write_failure.take() {
            return Err(ServiceError::Other(message));
        }
        state.files.insert(path.to_path_buf(), FileContent::text(content));
        Ok(())
    }
}

// =============================================================================
// MemoryDiffService
// =============================================================================

#[derive(Debug, Default)]
struct DiffState {
    diffs: HashMap<(PathBuf, bool), DiffContent>,
    failure: Option<String>,
    calls: Vec<(PathBuf, PathBuf, bool)>,
}

/// Diffs keyed by `(file, staged)`. Unknown files produce an empty diff.
#[derive(Debug, Default)]
pub struct MemoryDiffService {
    state: Mutex<DiffState>,
}

impl MemoryDiffService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diff(self, file: impl Into<PathBuf>, staged: bool, diff: impl Into<String>) -> Self {
        self.insert(file, staged, DiffContent::text(diff));
        self
    }

    pub fn insert(&self, file: impl Into<PathBuf>, staged: bool, diff: DiffContent) {
        lock(&self.state).diffs.insert((file.into(), staged), diff);
    }

    /// Makes the next diff request fail.
    pub fn fail_next(&self, message: impl Into<String>) {
        lock(&self.state).failure = Some(message.into());
    }

    /// Recorded `(root, file, staged)` triples.
    pub fn calls(&self) -> Vec<(PathBuf, PathBuf, bool)> {
        lock(&self.state).calls.clone()
    }
}

impl DiffService for MemoryDiffService {
    fn diff(&self, root: &Path, file: &Path, staged: bool) -> Result<DiffContent, ServiceError> {
        let mut state = lock(&self.state);
        state.calls.push((root.to_path_buf(), file.to_path_buf(), staged));
        if let Some(message) = state.failure.take() {
            return Err(ServiceError::Git(message));
        }
        Ok(state
            .diffs
            .get(&(file.to_path_buf(), staged))
            .cloned()
            .unwrap_or_default())
    }
}
