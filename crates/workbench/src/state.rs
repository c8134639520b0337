// Chunk: docs/chunks/workspace_core - Workspace-owned stores
//!
//! The stores one workspace owns: the tab strip, both preview caches, the
//! terminal registry, the right-panel flag and the two resize controllers.
//!
//! Nothing here is shared between workspaces. Mutation happens only inside
//! the reducer; hosts get read access through the accessors below.

use std::path::Path;

use workbench_terminal::{TerminalEntry, TerminalId, TerminalRegistry};

use crate::config::WorkbenchConfig;
use crate::layout::{FileTreeResize, SplitResize};
use crate::preview::{DiffPreview, FilePreview, PreviewCache};
use crate::services::ProjectContext;
use crate::tab::{diff_cache_key, file_cache_key, View};
use crate::tab_strip::{OpenTab, TabStrip};

pub struct WorkspaceState {
    pub(crate) config: WorkbenchConfig,
    pub(crate) project: ProjectContext,
    /// Bumped by every project reset. Completions carry the generation
    /// they were started under.
    pub(crate) generation: u64,
    pub(crate) strip: TabStrip,
    pub(crate) files: PreviewCache<FilePreview>,
    pub(crate) diffs: PreviewCache<DiffPreview>,
    pub(crate) terminals: TerminalRegistry,
    pub(crate) right_panel_open: bool,
    pub(crate) file_tree: FileTreeResize,
    pub(crate) split: SplitResize,
}

impl WorkspaceState {
    pub fn new(project: ProjectContext, config: WorkbenchConfig) -> Self {
        Self {
            file_tree: FileTreeResize::new(config.file_tree),
            split: SplitResize::new(config.split),
            config,
            project,
            generation: 0,
            strip: TabStrip::new(),
            files: PreviewCache::new(),
            diffs: PreviewCache::new(),
            terminals: TerminalRegistry::new(),
            right_panel_open: false,
        }
    }

    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    pub fn project(&self) -> &ProjectContext {
        &self.project
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn active(&self) -> &View {
        self.strip.active()
    }

    pub fn tabs(&self) -> &[OpenTab] {
        self.strip.tabs()
    }

    pub fn is_right_panel_open(&self) -> bool {
        self.right_panel_open
    }

    pub fn file_preview(&self, path: &Path) -> Option<&FilePreview> {
        self.files.get(&file_cache_key(path))
    }

    pub fn diff_preview(&self, file: &Path, staged: bool) -> Option<&DiffPreview> {
        self.diffs.get(&diff_cache_key(file, staged))
    }

    pub fn file_cache(&self) -> &PreviewCache<FilePreview> {
        &self.files
    }

    pub fn diff_cache(&self) -> &PreviewCache<DiffPreview> {
        &self.diffs
    }

    pub fn terminal(&self, id: &TerminalId) -> Option<&TerminalEntry> {
        self.terminals.get(id)
    }

    pub fn terminals(&self) -> &TerminalRegistry {
        &self.terminals
    }

    /// Whether `path` is the one editable file kind.
    pub fn is_editable(&self, path: &Path) -> bool {
        self.config.is_editable(path)
    }

    pub fn file_tree(&self) -> &FileTreeResize {
        &self.file_tree
    }

    pub fn split(&self) -> &SplitResize {
        &self.split
    }
}
