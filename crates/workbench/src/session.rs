// Chunk: docs/chunks/workspace_session_persistence - Session persistence
//!
//! Session persistence for the workspace.
//!
//! The session file captures, for one workspace path:
//! - the ordered list of file, diff and panel tabs
//! - the active tab key
//! - the file-tree width and chat split ratio
//!
//! Terminal tabs are NOT restored (their processes cannot be serialized).
//!
//! ## File Location
//!
//! `<data_dir>/workbench/session.json`, e.g.
//! `~/.local/share/workbench/session.json` on Linux.
//!
//! ## Schema Version
//!
//! A session whose schema version differs from the current one, or that
//! was written for a different workspace path, is ignored.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::APP_NAME;
use crate::msg::Msg;
use crate::tab::{PanelId, Tab, TabKey};
use crate::workspace::Workspace;

/// Current schema version for the session file.
///
/// Increment this when making breaking changes to the session format.
const SCHEMA_VERSION: u32 = 1;

/// Session file name.
const SESSION_FILENAME: &str = "session.json";

/// Errors that can occur while reading or writing a session file.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no data directory on this platform")]
    NoDataDir,
    #[error("session i/o failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed session file: {0}")]
    Parse(#[from] serde_json::Error),
}

// =============================================================================
// Serializable Data Types
// =============================================================================

/// Root session data structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub schema_version: u32,
    pub workspace_path: PathBuf,
    pub tabs: Vec<TabData>,
    pub active_tab: Option<TabKey>,
    pub file_tree_width: f64,
    pub split_ratio: f64,
}

/// Serializable representation of a restorable tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TabData {
    File { path: PathBuf },
    Diff { file: PathBuf, staged: bool },
    Panel { panel: PanelId },
}

impl TabData {
    fn from_tab(tab: &Tab) -> Option<Self> {
        match tab {
            Tab::File { path } => Some(TabData::File { path: path.clone() }),
            Tab::Diff { file, staged } => Some(TabData::Diff {
                file: file.clone(),
                staged: *staged,
            }),
            Tab::Panel(panel) => Some(TabData::Panel { panel: *panel }),
            Tab::Terminal { .. } => None,
        }
    }

    fn into_tab(self) -> Tab {
        match self {
            TabData::File { path } => Tab::File { path },
            TabData::Diff { file, staged } => Tab::Diff { file, staged },
            TabData::Panel { panel } => Tab::Panel(panel),
        }
    }
}

impl SessionData {
    /// Captures the restorable part of a workspace.
    pub fn from_workspace(workspace: &Workspace) -> Self {
        let state = workspace.state();
        let tabs: Vec<TabData> = state
            .tabs()
            .iter()
            .filter_map(|open| TabData::from_tab(&open.tab))
            .collect();
        // A terminal may be active; its key is simply not found on restore.
        let active_tab = state.active().tab_key();

        Self {
            schema_version: SCHEMA_VERSION,
            workspace_path: state.project().workspace_path.clone(),
            tabs,
            active_tab,
            file_tree_width: state.file_tree().raw_width(),
            split_ratio: state.split().ratio(),
        }
    }
}

// =============================================================================
// Session File Path
// =============================================================================

/// Returns the path to the default session file, if the platform has a
/// data directory.
pub fn session_file_path() -> Option<PathBuf> {
    Some(dirs::data_dir()?.join(APP_NAME).join(SESSION_FILENAME))
}

// =============================================================================
// Save / Load
// =============================================================================

/// Writes a session file atomically (temp file, then rename).
pub fn save_session_to(path: &Path, session: &SessionData) -> Result<(), SessionError> {
    let io_err = |source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(session)?;
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, json).map_err(io_err)?;
    fs::rename(&temp_path, path).map_err(io_err)?;

    tracing::debug!(path = %path.display(), tabs = session.tabs.len(), "session saved");
    Ok(())
}

/// Reads a session file.
///
/// A missing file or a schema mismatch yields `Ok(None)`.
pub fn load_session_from(path: &Path) -> Result<Option<SessionData>, SessionError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SessionError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let session: SessionData = serde_json::from_str(&contents)?;
    if session.schema_version != SCHEMA_VERSION {
        tracing::warn!(
            expected = SCHEMA_VERSION,
            found = session.schema_version,
            "session schema version mismatch, ignoring"
        );
        return Ok(None);
    }
    Ok(Some(session))
}

/// Saves to the default session file.
pub fn save_session(session: &SessionData) -> Result<(), SessionError> {
    let path = session_file_path().ok_or(SessionError::NoDataDir)?;
    save_session_to(&path, session)
}

/// Loads the default session file.
pub fn load_session() -> Result<Option<SessionData>, SessionError> {
    let path = session_file_path().ok_or(SessionError::NoDataDir)?;
    load_session_from(&path)
}

// =============================================================================
// Restore
// =============================================================================

impl Workspace {
    /// Restores tabs and layout from a session.
    ///
    /// Returns false (and changes nothing) when the session belongs to a
    /// different workspace path.
    pub fn restore_session(&mut self, session: SessionData) -> bool {
        if session.workspace_path != self.state().project().workspace_path {
            tracing::info!(
                session = %session.workspace_path.display(),
                "session is for another workspace, ignoring"
            );
            return false;
        }

        self.set_layout(session.file_tree_width, session.split_ratio);
        let tabs = session.tabs.into_iter().map(TabData::into_tab).collect();
        self.apply(Msg::RestoreTabs {
            tabs,
            active: session.active_tab,
        });
        true
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> SessionData {
        SessionData {
            schema_version: SCHEMA_VERSION,
            workspace_path: PathBuf::from("/w"),
            tabs: vec![
                TabData::File {
                    path: PathBuf::from("a.txt"),
                },
                TabData::Diff {
                    file: PathBuf::from("b.txt"),
                    staged: true,
                },
                TabData::Panel {
                    panel: PanelId::ProjectSummary,
                },
            ],
            active_tab: Some(TabKey::from_raw("diff:staged:b.txt")),
            file_tree_width: 300.0,
            split_ratio: 0.5,
        }
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join(SESSION_FILENAME);
        save_session_to(&path, &sample()).unwrap();

        let loaded = load_session_from(&path).unwrap().unwrap();
        assert_eq!(loaded, sample());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(load_session_from(&temp.path().join("none.json")).unwrap().is_none());
    }

    #[test]
    fn test_schema_mismatch_is_ignored() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(SESSION_FILENAME);
        let mut session = sample();
        session.schema_version = SCHEMA_VERSION + 1;
        save_session_to(&path, &session).unwrap();

        assert!(load_session_from(&path).unwrap().is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(SESSION_FILENAME);
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_session_from(&path), Err(SessionError::Parse(_))));
    }

    #[test]
    fn test_tab_data_json_shape() {
        let json = serde_json::to_string(&TabData::Panel {
            panel: PanelId::ProjectSummary,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"panel","panel":"project-summary"}"#);
    }
}
