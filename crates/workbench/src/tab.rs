// Chunk: docs/chunks/tab_identity - Tab and view identity model
//!
//! Identity model for everything the canvas can show.
//!
//! A `Tab` is an entry in the tab strip. A `View` is what the canvas is
//! currently rendering. Every tab maps to exactly one view, but two views
//! (`Empty` and `Output`) have no tab: they are reached through dedicated
//! buttons and never appear in the strip.
//!
//! Tabs are identified by a `TabKey` of the form `kind:discriminator`:
//!
//! ```text
//! file:<path>
//! diff:<staged|worktree>:<file>
//! terminal:<id>
//! panel:<panel-id>
//! ```
//!
//! The key is a pure function of the tab, and the strip never holds two tabs
//! with the same key.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use workbench_terminal::TerminalId;

// =============================================================================
// PanelId
// =============================================================================

/// Singleton static panels. At most one tab per panel may exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelId {
    ProjectSummary,
}

impl PanelId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PanelId::ProjectSummary => "project-summary",
        }
    }

    /// Human-readable title for the tab strip.
    pub fn title(&self) -> &'static str {
        match self {
            PanelId::ProjectSummary => "Project summary",
        }
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project-summary" => Ok(PanelId::ProjectSummary),
            other => Err(format!("unknown panel `{other}`")),
        }
    }
}

// =============================================================================
// TabKey
// =============================================================================

/// Stable identity of a tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabKey(String);

impl TabKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wraps a key string received from a host (e.g. a tab-strip click).
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn file(path: &Path) -> Self {
        Self(format!("file:{}", path.display()))
    }

    pub fn diff(file: &Path, staged: bool) -> Self {
        Self(format!("diff:{}:{}", diff_side(staged), file.display()))
    }

    pub fn terminal(id: &TerminalId) -> Self {
        Self(format!("terminal:{id}"))
    }

    pub fn panel(panel: PanelId) -> Self {
        Self(format!("panel:{panel}"))
    }
}

impl fmt::Display for TabKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn diff_side(staged: bool) -> &'static str {
    if staged {
        "staged"
    } else {
        "worktree"
    }
}

/// Key of a diff preview cache entry: `<staged|worktree>:<file>`.
pub fn diff_cache_key(file: &Path, staged: bool) -> String {
    format!("{}:{}", diff_side(staged), file.display())
}

/// Key of a file preview cache entry.
pub fn file_cache_key(path: &Path) -> String {
    path.display().to_string()
}

// =============================================================================
// TabKind
// =============================================================================

/// The kind of content a tab holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabKind {
    /// A file preview / editor
    File,
    /// A git diff view
    Diff,
    /// A terminal session
    Terminal,
    /// A static panel
    Panel,
}

// =============================================================================
// Tab
// =============================================================================

/// An openable view that lives in the tab strip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tab {
    File { path: PathBuf },
    /// `staged` picks the index diff over the working-tree diff, so one file
    /// can have two diff tabs open at once.
    Diff { file: PathBuf, staged: bool },
    /// `cwd` is fixed when the terminal is created.
    Terminal { id: TerminalId, cwd: PathBuf },
    Panel(PanelId),
}

impl Tab {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Tab::File { path: path.into() }
    }

    pub fn diff(file: impl Into<PathBuf>, staged: bool) -> Self {
        Tab::Diff {
            file: file.into(),
            staged,
        }
    }

    pub fn key(&self) -> TabKey {
        match self {
            Tab::File { path } => TabKey::file(path),
            Tab::Diff { file, staged } => TabKey::diff(file, *staged),
            Tab::Terminal { id, .. } => TabKey::terminal(id),
            Tab::Panel(panel) => TabKey::panel(*panel),
        }
    }

    pub fn kind(&self) -> TabKind {
        match self {
            Tab::File { .. } => TabKind::File,
            Tab::Diff { .. } => TabKind::Diff,
            Tab::Terminal { .. } => TabKind::Terminal,
            Tab::Panel(_) => TabKind::Panel,
        }
    }

    /// The view the canvas shows when this tab is active.
    pub fn view(&self) -> View {
        match self {
            Tab::File { path } => View::File { path: path.clone() },
            Tab::Diff { file, staged } => View::Diff {
                file: file.clone(),
                staged: *staged,
            },
            Tab::Terminal { id, .. } => View::Terminal { id: id.clone() },
            Tab::Panel(panel) => View::Panel(*panel),
        }
    }
}

// =============================================================================
// View
// =============================================================================

/// What the canvas is currently rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Empty,
    File { path: PathBuf },
    Diff { file: PathBuf, staged: bool },
    Terminal { id: TerminalId },
    /// Detached details region. Never backed by a tab.
    Output,
    Panel(PanelId),
}

impl View {
    /// Key of the tab backing this view, or `None` for `Empty` and `Output`.
    pub fn tab_key(&self) -> Option<TabKey> {
        match self {
            View::Empty | View::Output => None,
            View::File { path } => Some(TabKey::file(path)),
            View::Diff { file, staged } => Some(TabKey::diff(file, *staged)),
            View::Terminal { id } => Some(TabKey::terminal(id)),
            View::Panel(panel) => Some(TabKey::panel(*panel)),
        }
    }
}

/// Derives the tab-strip label for a tab.
///
/// Terminals are labelled by the order they were opened in, which the caller
/// supplies as `terminal_number`.
pub fn tab_label(tab: &Tab, terminal_number: usize) -> String {
    match tab {
        Tab::File { path } => file_label(path),
        Tab::Diff { file, staged } => {
            let side = if *staged { "staged" } else { "working tree" };
            format!("{} ({side})", file_label(file))
        }
        Tab::Terminal { .. } => format!("Terminal {terminal_number}"),
        Tab::Panel(panel) => panel.title().to_string(),
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// =============================================================================
// Tests
// =============================================================================
