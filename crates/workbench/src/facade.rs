//! Imperative surface for sibling components.
//!
//! File trees, header buttons and chat panels hold a [`WorkspaceController`]
//! (or any other [`WorkspaceFacade`]) instead of the workspace itself. Every
//! call only enqueues a message; nothing is returned to the caller.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::msg::Msg;
use crate::tab::PanelId;
use crate::workspace::Workspace;

/// Options for opening a terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTerminalOptions {
    /// Working directory. Defaults to the workspace path.
    pub path: Option<PathBuf>,
    /// Focus the terminal once its session is attached.
    pub focus: bool,
}

impl Default for OpenTerminalOptions {
    fn default() -> Self {
        Self {
            path: None,
            focus: true,
        }
    }
}

/// Operations sibling components may request of the workspace.
///
/// Opening any tab also opens the right-hand panel.
pub trait WorkspaceFacade {
    fn open_file(&self, path: &Path);
    fn open_diff(&self, file: &Path, staged: bool);
    fn open_project_summary(&self);
    fn open_terminal(&self, options: OpenTerminalOptions);
    fn toggle_right_panel(&self);
    /// Panel state as of the last processed message.
    fn is_right_panel_open(&self) -> bool;
}

/// Cloneable, thread-safe handle onto a workspace's message queue.
#[derive(Clone)]
pub struct WorkspaceController {
    tx: Sender<Msg>,
    right_panel_open: Arc<AtomicBool>,
}

impl WorkspaceController {
    pub(crate) fn new(tx: Sender<Msg>, right_panel_open: Arc<AtomicBool>) -> Self {
        Self { tx, right_panel_open }
    }

    fn send(&self, msg: Msg) {
        if self.tx.send(msg).is_err() {
            tracing::debug!("workspace gone, dropping request");
        }
    }
}

impl WorkspaceFacade for WorkspaceController {
    fn open_file(&self, path: &Path) {
        self.send(Msg::OpenFile {
            path: path.to_path_buf(),
        });
    }

    fn open_diff(&self, file: &Path, staged: bool) {
        self.send(Msg::OpenDiff {
            file: file.to_path_buf(),
            staged,
        });
    }

    fn open_project_summary(&self) {
        self.send(Msg::OpenPanel(PanelId::ProjectSummary));
    }

    fn open_terminal(&self, options: OpenTerminalOptions) {
        self.send(Msg::OpenTerminal {
            cwd: options.path,
            focus: options.focus,
        });
    }

    fn toggle_right_panel(&self) {
        self.send(Msg::ToggleRightPanel);
    }

    fn is_right_panel_open(&self) -> bool {
        self.right_panel_open.load(Ordering::Acquire)
    }
}

impl WorkspaceFacade for Workspace {
    fn open_file(&self, path: &Path) {
        self.dispatch(Msg::OpenFile {
            path: path.to_path_buf(),
        });
    }

    fn open_diff(&self, file: &Path, staged: bool) {
        self.dispatch(Msg::OpenDiff {
            file: file.to_path_buf(),
            staged,
        });
    }

    fn open_project_summary(&self) {
        self.dispatch(Msg::OpenPanel(PanelId::ProjectSummary));
    }

    fn open_terminal(&self, options: OpenTerminalOptions) {
        self.dispatch(Msg::OpenTerminal {
            cwd: options.path,
            focus: options.focus,
        });
    }

    fn toggle_right_panel(&self) {
        self.dispatch(Msg::ToggleRightPanel);
    }

    fn is_right_panel_open(&self) -> bool {
        self.state().is_right_panel_open()
    }
}
