// Chunk: docs/chunks/workspace_core - Message reducer
//!
//! The single update function of the workspace.
//!
//! `reduce` is total: it never fails and never blocks. Service failures
//! arrive as `Err(String)` inside completion messages and end up on the
//! cache or registry entry that asked for them.

use std::path::{Path, PathBuf};

use workbench_terminal::{ConnectRequest, RestartOutcome, TerminalEvent, TerminalId};

use crate::msg::{Effect, Msg};
use crate::preview::Ensure;
use crate::services::ProjectContext;
use crate::state::WorkspaceState;
use crate::tab::{diff_cache_key, file_cache_key, Tab, TabKey, View};

pub(crate) fn reduce(state: &mut WorkspaceState, msg: Msg) -> Vec<Effect> {
    match msg {
        Msg::OpenFile { path } => open(state, Tab::File { path }),
        Msg::OpenDiff { file, staged } => open(state, Tab::Diff { file, staged }),
        Msg::OpenPanel(panel) => open(state, Tab::Panel(panel)),
        Msg::OpenTerminal { cwd, focus } => open_terminal(state, cwd, focus),

        Msg::ActivateTab(key) => {
            if !state.strip.activate(&key) {
                tracing::debug!(%key, "activate ignored, no such tab");
                return Vec::new();
            }
            ensure_active(state)
        }

        Msg::CloseTab(key) => close(state, &key),

        Msg::ShowOutput => {
            state.strip.show_output();
            Vec::new()
        }

        Msg::ShowEmpty => {
            state.strip.show_empty();
            Vec::new()
        }

        Msg::ToggleRightPanel => {
            state.right_panel_open = !state.right_panel_open;
            Vec::new()
        }

        Msg::SetRightPanelOpen(open) => {
            state.right_panel_open = open;
            Vec::new()
        }

        Msg::RestoreTabs { tabs, active } => restore(state, tabs, active),

        Msg::UpdateDraft { path, text } => {
            if let Some(entry) = state.files.get_mut(&file_cache_key(&path)) {
                if !entry.update_draft(text) {
                    tracing::debug!(path = %path.display(), "draft edit rejected on read-only preview");
                }
            }
            Vec::new()
        }

        Msg::RevertDraft { path } => {
            if let Some(entry) = state.files.get_mut(&file_cache_key(&path)) {
                entry.revert_draft();
            }
            Vec::new()
        }

        Msg::SaveDraft { path } => {
            let editable = state.config.is_editable(&path);
            let Some(entry) = state.files.get_mut(&file_cache_key(&path)) else {
                return Vec::new();
            };
            match entry.begin_save(editable) {
                Ok(text) => vec![Effect::WriteFile {
                    root: state.project.workspace_path.clone(),
                    path,
                    text,
                }],
                Err(reason) => {
                    tracing::debug!(path = %path.display(), ?reason, "save skipped");
                    Vec::new()
                }
            }
        }

        Msg::FocusTerminal { id } => {
            state.terminals.focus(&id);
            Vec::new()
        }

        Msg::RestartTerminal { id } => match state.terminals.restart(&id) {
            Ok(RestartOutcome::Reconnect { cwd }) => {
                tracing::info!(terminal = %id, cwd = %cwd.display(), "reconnecting terminal");
                vec![connect(state, id, cwd)]
            }
            Ok(outcome) => {
                tracing::debug!(terminal = %id, ?outcome, "terminal restart");
                Vec::new()
            }
            Err(err) => {
                tracing::warn!(terminal = %id, %err, "terminal restart failed");
                Vec::new()
            }
        },

        Msg::ClearTerminal { id } => {
            state.terminals.clear(&id);
            Vec::new()
        }

        Msg::WriteTerminal { id, data } => {
            if let Err(err) = state.terminals.write(&id, &data) {
                tracing::warn!(terminal = %id, %err, "terminal write failed");
            }
            Vec::new()
        }

        Msg::EndTerminal { id } => {
            // Closing the tab terminates the session exactly once.
            tracing::info!(terminal = %id, "terminal ended");
            close(state, &TabKey::terminal(&id))
        }

        Msg::ResetProject { workspace_path } => {
            let terminated = state.terminals.terminate_all();
            state.strip.clear();
            state.files.clear();
            state.diffs.clear();
            state.generation += 1;
            tracing::info!(
                workspace = %workspace_path.display(),
                terminated,
                generation = state.generation,
                "project reset"
            );
            state.project = ProjectContext::new(workspace_path);
            Vec::new()
        }

        Msg::Teardown => {
            let terminated = state.terminals.terminate_all();
            tracing::info!(terminated, "workspace teardown");
            Vec::new()
        }

        Msg::FileLoaded {
            generation,
            path,
            result,
        } => {
            if is_stale(state, generation) {
                tracing::warn!(path = %path.display(), "dropping file load from previous project");
                return Vec::new();
            }
            state.files.complete(&file_cache_key(&path), result);
            Vec::new()
        }

        Msg::DiffLoaded {
            generation,
            file,
            staged,
            result,
        } => {
            if is_stale(state, generation) {
                tracing::warn!(file = %file.display(), "dropping diff load from previous project");
                return Vec::new();
            }
            state.diffs.complete(&diff_cache_key(&file, staged), result);
            Vec::new()
        }

        Msg::FileSaved {
            generation,
            path,
            text,
            result,
        } => {
            if is_stale(state, generation) {
                tracing::warn!(path = %path.display(), "dropping save result from previous project");
                return Vec::new();
            }
            if let Err(message) = &result {
                tracing::warn!(path = %path.display(), error = %message, "save failed");
            }
            match state.files.get_mut(&file_cache_key(&path)) {
                Some(entry) => entry.complete_save(text, result),
                None => tracing::debug!(path = %path.display(), "save finished after tab closed"),
            }
            Vec::new()
        }

        Msg::TerminalConnected {
            generation,
            id,
            result,
        } => {
            match result {
                Ok(mut handle) if is_stale(state, generation) => {
                    tracing::warn!(terminal = %id, "terminating session from previous project");
                    handle.terminate();
                }
                Ok(handle) => {
                    if state.terminals.attach(&id, handle) {
                        tracing::info!(terminal = %id, "terminal attached");
                    }
                }
                Err(message) => {
                    tracing::warn!(terminal = %id, error = %message, "terminal connect failed");
                    state.terminals.connect_failed(&id, message);
                }
            }
            Vec::new()
        }

        Msg::Terminal(event) => {
            terminal_event(state, event);
            Vec::new()
        }
    }
}

fn is_stale(state: &WorkspaceState, generation: u64) -> bool {
    generation != state.generation
}

// =============================================================================
// Tab transitions
// =============================================================================

fn open(state: &mut WorkspaceState, tab: Tab) -> Vec<Effect> {
    let key = tab.key();
    let outcome = state.strip.open(tab);
    state.right_panel_open = true;
    tracing::debug!(%key, ?outcome, "open tab");
    ensure_active(state)
}

fn open_terminal(state: &mut WorkspaceState, cwd: Option<PathBuf>, focus: bool) -> Vec<Effect> {
    let cwd = cwd.unwrap_or_else(|| state.project.workspace_path.clone());
    let id = TerminalId::generate();

    state.terminals.insert(id.clone(), cwd.clone());
    if focus {
        state.terminals.focus(&id);
    }
    state.strip.open(Tab::Terminal {
        id: id.clone(),
        cwd: cwd.clone(),
    });
    state.right_panel_open = true;
    tracing::info!(terminal = %id, cwd = %cwd.display(), "terminal opened");

    vec![connect(state, id, cwd)]
}

fn connect(state: &WorkspaceState, id: TerminalId, cwd: PathBuf) -> Effect {
    Effect::ConnectTerminal {
        request: ConnectRequest {
            id,
            cwd,
            cols: state.config.terminal.cols,
            rows: state.config.terminal.rows,
        },
    }
}

fn close(state: &mut WorkspaceState, key: &TabKey) -> Vec<Effect> {
    let Some(tab) = state.strip.close(key) else {
        tracing::debug!(%key, "close ignored, no such tab");
        return Vec::new();
    };
    tracing::debug!(%key, "close tab");

    match &tab {
        Tab::File { path } => {
            state.files.remove(&file_cache_key(path));
        }
        Tab::Diff { file, staged } => {
            state.diffs.remove(&diff_cache_key(file, *staged));
        }
        Tab::Terminal { id, .. } => {
            state.terminals.remove(id);
        }
        Tab::Panel(_) => {}
    }

    ensure_active(state)
}

fn restore(state: &mut WorkspaceState, tabs: Vec<Tab>, active: Option<TabKey>) -> Vec<Effect> {
    let mut restored = 0;
    for tab in tabs {
        if matches!(tab, Tab::Terminal { .. }) {
            continue;
        }
        state.strip.open(tab);
        restored += 1;
    }
    if let Some(active) = active {
        state.strip.activate(&active);
    }
    if restored > 0 {
        state.right_panel_open = true;
    }
    tracing::info!(restored, "tabs restored");
    ensure_active(state)
}

/// Starts a fetch for the active view's preview if it needs one.
fn ensure_active(state: &mut WorkspaceState) -> Vec<Effect> {
    match state.strip.active().clone() {
        View::File { path } => ensure_file(state, &path),
        View::Diff { file, staged } => ensure_diff(state, &file, staged),
        View::Empty | View::Output | View::Terminal { .. } | View::Panel(_) => Vec::new(),
    }
}

fn ensure_file(state: &mut WorkspaceState, path: &Path) -> Vec<Effect> {
    match state.files.ensure(&file_cache_key(path)) {
        Ensure::Fetch => vec![Effect::ReadFile {
            root: state.project.workspace_path.clone(),
            path: path.to_path_buf(),
        }],
        outcome => {
            tracing::debug!(path = %path.display(), ?outcome, "file fetch not needed");
            Vec::new()
        }
    }
}

fn ensure_diff(state: &mut WorkspaceState, file: &Path, staged: bool) -> Vec<Effect> {
    match state.diffs.ensure(&diff_cache_key(file, staged)) {
        Ensure::Fetch => vec![Effect::LoadDiff {
            root: state.project.workspace_path.clone(),
            file: file.to_path_buf(),
            staged,
        }],
        outcome => {
            tracing::debug!(file = %file.display(), staged, ?outcome, "diff fetch not needed");
            Vec::new()
        }
    }
}

// =============================================================================
// Terminal events
// =============================================================================

fn terminal_event(state: &mut WorkspaceState, event: TerminalEvent) {
    match event {
        TerminalEvent::Status { id, status, error } => {
            if state.terminals.apply_status(&id, status, error) {
                tracing::debug!(terminal = %id, status = status.label(), "terminal status");
            }
        }
        TerminalEvent::Activity { id } => {
            state.strip.mark_unread(&TabKey::terminal(&id));
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
