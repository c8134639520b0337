//! Messages consumed by the reducer and the effects it emits.
//!
//! Host intents and background completions travel through the same queue,
//! so every state change goes through one `reduce` call at a time.

use std::path::PathBuf;

use workbench_terminal::{ConnectRequest, TerminalEvent, TerminalId, TerminalSession};

use crate::services::{DiffContent, FileContent};
use crate::tab::{PanelId, Tab, TabKey};

/// Input to the reducer.
pub enum Msg {
    // -- intents --------------------------------------------------------------
    OpenFile {
        path: PathBuf,
    },
    OpenDiff {
        file: PathBuf,
        staged: bool,
    },
    /// `cwd` defaults to the workspace path.
    OpenTerminal {
        cwd: Option<PathBuf>,
        focus: bool,
    },
    OpenPanel(PanelId),
    ActivateTab(TabKey),
    CloseTab(TabKey),
    ShowOutput,
    ShowEmpty,
    ToggleRightPanel,
    SetRightPanelOpen(bool),
    /// Reopens saved tabs without fetching anything but the active one.
    RestoreTabs {
        tabs: Vec<Tab>,
        active: Option<TabKey>,
    },

    UpdateDraft {
        path: PathBuf,
        text: String,
    },
    RevertDraft {
        path: PathBuf,
    },
    SaveDraft {
        path: PathBuf,
    },

    FocusTerminal {
        id: TerminalId,
    },
    RestartTerminal {
        id: TerminalId,
    },
    ClearTerminal {
        id: TerminalId,
    },
    WriteTerminal {
        id: TerminalId,
        data: Vec<u8>,
    },
    /// Terminates the session and closes its tab.
    EndTerminal {
        id: TerminalId,
    },

    ResetProject {
        workspace_path: PathBuf,
    },
    /// Terminates every terminal session.
    Teardown,

    // -- completions ----------------------------------------------------------
    FileLoaded {
        generation: u64,
        path: PathBuf,
        result: Result<FileContent, String>,
    },
    DiffLoaded {
        generation: u64,
        file: PathBuf,
        staged: bool,
        result: Result<DiffContent, String>,
    },
    FileSaved {
        generation: u64,
        path: PathBuf,
        text: String,
        result: Result<(), String>,
    },
    TerminalConnected {
        generation: u64,
        id: TerminalId,
        result: Result<Box<dyn TerminalSession>, String>,
    },
    Terminal(TerminalEvent),
}

/// Background work requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ReadFile { root: PathBuf, path: PathBuf },
    LoadDiff { root: PathBuf, file: PathBuf, staged: bool },
    WriteFile { root: PathBuf, path: PathBuf, text: String },
    ConnectTerminal { request: ConnectRequest },
}

impl std::fmt::Debug for Msg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Msg::OpenFile { path } => f.debug_struct("OpenFile").field("path", path).finish(),
            Msg::OpenDiff { file, staged } => f
                .debug_struct("OpenDiff")
                .field("file", file)
                .field("staged", staged)
                .finish(),
            Msg::OpenTerminal { cwd, focus } => f
                .debug_struct("OpenTerminal")
                .field("cwd", cwd)
                .field("focus", focus)
                .finish(),
            Msg::OpenPanel(panel) => f.debug_tuple("OpenPanel").field(panel).finish(),
            Msg::ActivateTab(key) => f.debug_tuple("ActivateTab").field(key).finish(),
            Msg::CloseTab(key) => f.debug_tuple("CloseTab").field(key).finish(),
            Msg::ShowOutput => f.write_str("ShowOutput"),
            Msg::ShowEmpty => f.write_str("ShowEmpty"),
            Msg::ToggleRightPanel => f.write_str("ToggleRightPanel"),
            Msg::SetRightPanelOpen(open) => f.debug_tuple("SetRightPanelOpen").field(open).finish(),
            Msg::RestoreTabs { tabs, active } => f
                .debug_struct("RestoreTabs")
                .field("tabs", &tabs.len())
                .field("active", active)
                .finish(),
            Msg::UpdateDraft { path, text } => f
                .debug_struct("UpdateDraft")
                .field("path", path)
                .field("text_len", &text.len())
                .finish(),
            Msg::RevertDraft { path } => f.debug_struct("RevertDraft").field("path", path).finish(),
            Msg::SaveDraft { path } => f.debug_struct("SaveDraft").field("path", path).finish(),
            Msg::FocusTerminal { id } => f.debug_struct("FocusTerminal").field("id", id).finish(),
            Msg::RestartTerminal { id } => f.debug_struct("RestartTerminal").field("id", id).finish(),
            Msg::ClearTerminal { id } => f.debug_struct("ClearTerminal").field("id", id).finish(),
            Msg::WriteTerminal { id, data } => f
                .debug_struct("WriteTerminal")
                .field("id", id)
                .field("bytes", &data.len())
                .finish(),
            Msg::EndTerminal { id } => f.debug_struct("EndTerminal").field("id", id).finish(),
            Msg::ResetProject { workspace_path } => f
                .debug_struct("ResetProject")
                .field("workspace_path", workspace_path)
                .finish(),
            Msg::Teardown => f.write_str("Teardown"),
            Msg::FileLoaded {
                generation,
                path,
                result,
            } => f
                .debug_struct("FileLoaded")
                .field("generation", generation)
                .field("path", path)
                .field("ok", &result.is_ok())
                .finish(),
            Msg::DiffLoaded {
                generation,
                file,
                staged,
                result,
            } => f
                .debug_struct("DiffLoaded")
                .field("generation", generation)
                .field("file", file)
                .field("staged", staged)
                .field("ok", &result.is_ok())
                .finish(),
            Msg::FileSaved {
                generation,
                path,
                result,
                ..
            } => f
                .debug_struct("FileSaved")
                .field("generation", generation)
                .field("path", path)
                .field("result", result)
                .finish(),
            Msg::TerminalConnected { generation, id, result } => f
                .debug_struct("TerminalConnected")
                .field("generation", generation)
                .field("id", id)
                .field("error", &result.as_ref().err())
                .finish(),
            Msg::Terminal(event) => f.debug_tuple("Terminal").field(event).finish(),
        }
    }
}
