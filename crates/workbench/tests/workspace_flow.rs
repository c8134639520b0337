//! End-to-end workspace flows against in-memory services.
//!
//! Background work runs on a `ManualSpawner`, so every test decides exactly
//! when reads, saves and terminal connects complete.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use workbench::{
    FileContent, ManualSpawner, MemoryDiffService, MemoryFileService, Msg, OpenTerminalOptions, PanelId,
    ProjectContext, Tab, TabKey, View, WorkbenchConfig, Workspace, WorkspaceFacade, WorkspaceServices,
};
use workbench_terminal::{MemoryTransport, TerminalId, TerminalStatus, CLOSED_BEFORE_CONNECT};

struct Fixture {
    workspace: Workspace,
    spawner: ManualSpawner,
    files: Arc<MemoryFileService>,
    diffs: Arc<MemoryDiffService>,
    transport: Arc<MemoryTransport>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_transport(MemoryTransport::new())
    }

    fn with_transport(transport: MemoryTransport) -> Self {
        let spawner = ManualSpawner::new();
        let files = Arc::new(
            MemoryFileService::new()
                .with_file("a.txt", "alpha")
                .with_file("b.txt", "beta")
                .with_file("c.txt", "gamma")
                .with_file("workbench.toml", "[split]\ndefault_ratio = 0.4\n"),
        );
        let diffs = Arc::new(
            MemoryDiffService::new()
                .with_diff("x.txt", false, "-old\n+new\n")
                .with_diff("x.txt", true, "+staged\n"),
        );
        let transport = Arc::new(transport);
        let services = WorkspaceServices {
            files: files.clone(),
            diffs: diffs.clone(),
            terminals: transport.clone(),
        };
        let workspace = Workspace::new(
            ProjectContext::new("/project"),
            WorkbenchConfig::default(),
            services,
            Arc::new(spawner.clone()),
        );
        Self {
            workspace,
            spawner,
            files,
            diffs,
            transport,
        }
    }

    /// Pumps and runs background tasks until nothing is left.
    fn settle(&mut self) {
        loop {
            self.workspace.pump();
            if self.spawner.run_pending() == 0 {
                self.workspace.pump();
                break;
            }
        }
    }

    fn open(&mut self, path: &str) {
        self.workspace.open_file(Path::new(path));
        self.settle();
    }

    fn keys(&self) -> Vec<String> {
        self.workspace
            .state()
            .tabs()
            .iter()
            .map(|t| t.key.to_string())
            .collect()
    }

    fn terminal_ids(&self) -> Vec<TerminalId> {
        self.workspace
            .state()
            .tabs()
            .iter()
            .filter_map(|t| match &t.tab {
                Tab::Terminal { id, .. } => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    fn open_terminal(&mut self) -> TerminalId {
        self.workspace.open_terminal(OpenTerminalOptions::default());
        self.settle();
        self.terminal_ids().pop().expect("terminal tab")
    }
}

fn file_view(path: &str) -> View {
    View::File {
        path: PathBuf::from(path),
    }
}

// =============================================================================
// Tab / view state machine
// =============================================================================

#[test]
fn test_starts_empty_with_panel_closed() {
    let fx = Fixture::new();
    assert!(fx.workspace.state().tabs().is_empty());
    assert_eq!(fx.workspace.state().active(), &View::Empty);
    assert!(!fx.workspace.is_right_panel_open());
}

#[test]
fn test_open_file_twice_keeps_one_tab() {
    let mut fx = Fixture::new();
    fx.open("a.txt");
    fx.open("a.txt");

    assert_eq!(fx.keys(), vec!["file:a.txt"]);
    assert_eq!(fx.workspace.state().active(), &file_view("a.txt"));
    assert_eq!(fx.files.read_calls(Path::new("a.txt")), 1);
}

#[test]
fn test_open_loads_content_and_opens_panel() {
    let mut fx = Fixture::new();
    fx.open("a.txt");

    let preview = fx.workspace.state().file_preview(Path::new("a.txt")).unwrap();
    assert!(!preview.loading);
    assert_eq!(preview.content.as_deref(), Some("alpha"));
    assert!(fx.workspace.is_right_panel_open());
}

#[test]
fn test_close_active_middle_tab_falls_back_to_last() {
    let mut fx = Fixture::new();
    fx.open("a.txt");
    fx.open("b.txt");
    fx.open("c.txt");
    fx.workspace.apply(Msg::ActivateTab(TabKey::file(Path::new("b.txt"))));
    fx.workspace.apply(Msg::CloseTab(TabKey::file(Path::new("b.txt"))));

    assert_eq!(fx.keys(), vec!["file:a.txt", "file:c.txt"]);
    assert_eq!(fx.workspace.state().active(), &file_view("c.txt"));
    assert!(fx.workspace.state().file_preview(Path::new("b.txt")).is_none());
}

#[test]
fn test_close_only_tab_goes_empty() {
    let mut fx = Fixture::new();
    fx.open("a.txt");
    fx.workspace.apply(Msg::CloseTab(TabKey::file(Path::new("a.txt"))));

    assert_eq!(fx.workspace.state().active(), &View::Empty);
    assert!(fx.workspace.state().tabs().is_empty());
}

#[test]
fn test_staged_and_worktree_diffs_are_distinct_tabs() {
    let mut fx = Fixture::new();
    fx.workspace.open_diff(Path::new("x.txt"), false);
    fx.workspace.open_diff(Path::new("x.txt"), true);
    fx.settle();

    assert_eq!(fx.keys(), vec!["diff:worktree:x.txt", "diff:staged:x.txt"]);
    let state = fx.workspace.state();
    assert_eq!(
        state.diff_preview(Path::new("x.txt"), false).unwrap().diff.as_deref(),
        Some("-old\n+new\n")
    );
    assert_eq!(
        state.diff_preview(Path::new("x.txt"), true).unwrap().diff.as_deref(),
        Some("+staged\n")
    );
    let roots: Vec<PathBuf> = fx.diffs.calls().into_iter().map(|(root, _, _)| root).collect();
    assert_eq!(roots, vec![PathBuf::from("/project"), PathBuf::from("/project")]);
}

#[test]
fn test_output_view_has_no_tab() {
    let mut fx = Fixture::new();
    fx.open("a.txt");
    fx.workspace.apply(Msg::ShowOutput);

    assert_eq!(fx.workspace.state().active(), &View::Output);
    assert_eq!(fx.keys(), vec!["file:a.txt"]);

    fx.workspace.apply(Msg::ShowEmpty);
    assert_eq!(fx.workspace.state().active(), &View::Empty);
}

#[test]
fn test_project_summary_is_singleton() {
    let mut fx = Fixture::new();
    fx.workspace.open_project_summary();
    fx.open("a.txt");
    fx.workspace.open_project_summary();
    fx.settle();

    assert_eq!(fx.keys(), vec!["panel:project-summary", "file:a.txt"]);
    assert_eq!(fx.workspace.state().active(), &View::Panel(PanelId::ProjectSummary));
}

#[test]
fn test_toggle_right_panel() {
    let mut fx = Fixture::new();
    fx.workspace.toggle_right_panel();
    fx.settle();
    assert!(fx.workspace.is_right_panel_open());
    fx.workspace.toggle_right_panel();
    fx.settle();
    assert!(!fx.workspace.is_right_panel_open());

    // Opening anything forces the panel open again.
    fx.open("a.txt");
    assert!(fx.workspace.is_right_panel_open());
}

// =============================================================================
// Preview cache
// =============================================================================

#[test]
fn test_three_concurrent_ensures_read_once() {
    let mut fx = Fixture::new();
    for _ in 0..3 {
        fx.workspace.open_file(Path::new("a.txt"));
    }
    fx.workspace.pump();

    assert!(fx.workspace.state().file_preview(Path::new("a.txt")).unwrap().loading);
    assert_eq!(fx.spawner.pending(), 1);
    fx.settle();
    assert_eq!(fx.files.read_calls(Path::new("a.txt")), 1);
}

#[test]
fn test_failed_read_then_retry() {
    let mut fx = Fixture::new();
    fx.files.fail_reads("a.txt", "connection reset");
    fx.open("a.txt");

    let preview = fx.workspace.state().file_preview(Path::new("a.txt")).unwrap();
    assert!(!preview.loading);
    assert_eq!(preview.error.as_deref(), Some("connection reset"));

    fx.files.clear_read_failure(Path::new("a.txt"));
    fx.open("a.txt");

    let preview = fx.workspace.state().file_preview(Path::new("a.txt")).unwrap();
    assert!(preview.error.is_none());
    assert_eq!(preview.content.as_deref(), Some("alpha"));
    assert_eq!(fx.files.read_calls(Path::new("a.txt")), 2);
}

#[test]
fn test_error_in_one_tab_does_not_touch_others() {
    let mut fx = Fixture::new();
    fx.open("a.txt");
    fx.open("missing.txt");

    let state = fx.workspace.state();
    assert!(state.file_preview(Path::new("missing.txt")).unwrap().error.is_some());
    assert!(state.file_preview(Path::new("a.txt")).unwrap().error.is_none());
}

#[test]
fn test_close_before_fetch_resolves_leaves_no_entry() {
    let mut fx = Fixture::new();
    fx.workspace.open_file(Path::new("a.txt"));
    fx.workspace.pump();
    fx.workspace.apply(Msg::CloseTab(TabKey::file(Path::new("a.txt"))));
    fx.settle();

    assert!(fx.workspace.state().file_preview(Path::new("a.txt")).is_none());
    assert_eq!(fx.workspace.state().file_cache().in_flight_len(), 0);
}

#[test]
fn test_reopen_during_fetch_joins_it() {
    let mut fx = Fixture::new();
    fx.workspace.open_file(Path::new("a.txt"));
    fx.workspace.pump();
    fx.workspace.apply(Msg::CloseTab(TabKey::file(Path::new("a.txt"))));
    fx.workspace.apply(Msg::OpenFile {
        path: PathBuf::from("a.txt"),
    });
    fx.settle();

    assert_eq!(fx.files.read_calls(Path::new("a.txt")), 1);
    let preview = fx.workspace.state().file_preview(Path::new("a.txt")).unwrap();
    assert_eq!(preview.content.as_deref(), Some("alpha"));
}

// =============================================================================
// Draft buffer
// =============================================================================

fn edit(fx: &mut Fixture, path: &str, text: &str) {
    fx.workspace.apply(Msg::UpdateDraft {
        path: PathBuf::from(path),
        text: text.to_string(),
    });
}

fn save(fx: &mut Fixture, path: &str) {
    fx.workspace.apply(Msg::SaveDraft {
        path: PathBuf::from(path),
    });
    fx.settle();
}

#[test]
fn test_save_clean_file_makes_no_write() {
    let mut fx = Fixture::new();
    fx.open("workbench.toml");
    save(&mut fx, "workbench.toml");
    assert!(fx.files.writes().is_empty());
}

#[test]
fn test_edit_and_save_editable_file() {
    let mut fx = Fixture::new();
    fx.open("workbench.toml");
    edit(&mut fx, "workbench.toml", "[split]\ndefault_ratio = 0.5\n");
    assert!(fx.workspace.state().file_preview(Path::new("workbench.toml")).unwrap().dirty);

    save(&mut fx, "workbench.toml");

    let preview = fx.workspace.state().file_preview(Path::new("workbench.toml")).unwrap();
    assert!(!preview.dirty);
    assert!(!preview.saving);
    assert_eq!(preview.content.as_deref(), Some("[split]\ndefault_ratio = 0.5\n"));
    assert_eq!(
        fx.files.contents(Path::new("workbench.toml")).as_deref(),
        Some("[split]\ndefault_ratio = 0.5\n")
    );
}

#[test]
fn test_failed_save_keeps_draft_for_retry() {
    let mut fx = Fixture::new();
    fx.open("workbench.toml");
    edit(&mut fx, "workbench.toml", "broken");
    fx.files.fail_next_write("read-only file system");
    save(&mut fx, "workbench.toml");

    let preview = fx.workspace.state().file_preview(Path::new("workbench.toml")).unwrap();
    assert!(preview.dirty);
    assert_eq!(preview.draft, "broken");
    assert_eq!(preview.save_error.as_deref(), Some("read-only file system"));

    save(&mut fx, "workbench.toml");
    let preview = fx.workspace.state().file_preview(Path::new("workbench.toml")).unwrap();
    assert!(!preview.dirty);
    assert!(preview.save_error.is_none());
    assert_eq!(fx.files.writes().len(), 2);
}

#[test]
fn test_other_files_are_read_only_for_save() {
    let mut fx = Fixture::new();
    fx.open("a.txt");
    edit(&mut fx, "a.txt", "changed");
    save(&mut fx, "a.txt");
    assert!(fx.files.writes().is_empty());
}

#[test]
fn test_truncated_file_rejects_edits() {
    let mut fx = Fixture::new();
    fx.files.insert(
        "workbench.toml",
        FileContent {
            content: "partial".into(),
            truncated: true,
            is_binary: false,
        },
    );
    fx.open("workbench.toml");
    edit(&mut fx, "workbench.toml", "changed");

    let preview = fx.workspace.state().file_preview(Path::new("workbench.toml")).unwrap();
    assert_eq!(preview.draft, "partial");
    assert!(!preview.dirty);
}

#[test]
fn test_edit_while_loading_is_ignored() {
    let mut fx = Fixture::new();
    fx.workspace.open_file(Path::new("workbench.toml"));
    fx.workspace.pump();
    assert!(fx.workspace.state().file_preview(Path::new("workbench.toml")).unwrap().loading);

    edit(&mut fx, "workbench.toml", "typed too early");
    save(&mut fx, "workbench.toml");
    fx.settle();

    let preview = fx.workspace.state().file_preview(Path::new("workbench.toml")).unwrap();
    assert!(!preview.dirty);
    assert_eq!(preview.draft, "[split]\ndefault_ratio = 0.4\n");
    assert!(fx.files.writes().is_empty());
}

#[test]
fn test_revert_discards_edits() {
    let mut fx = Fixture::new();
    fx.open("workbench.toml");
    edit(&mut fx, "workbench.toml", "junk");
    fx.workspace.apply(Msg::RevertDraft {
        path: PathBuf::from("workbench.toml"),
    });

    let preview = fx.workspace.state().file_preview(Path::new("workbench.toml")).unwrap();
    assert!(!preview.dirty);
    assert_eq!(Some(preview.draft.as_str()), preview.content.as_deref());
}

// =============================================================================
// Terminals
// =============================================================================

#[test]
fn test_terminal_connects_in_workspace_cwd() {
    let mut fx = Fixture::new();
    let id = fx.open_terminal();

    let entry = fx.workspace.state().terminal(&id).unwrap();
    assert_eq!(entry.status(), TerminalStatus::Connected);
    assert!(entry.is_attached());
    assert_eq!(entry.cwd(), Path::new("/project"));
    assert_eq!(fx.transport.requests()[0].cwd, PathBuf::from("/project"));
    assert_eq!(fx.workspace.state().active(), &View::Terminal { id: id.clone() });

    // Focus requested at open is delivered once the session attaches.
    assert_eq!(fx.transport.probe(&id).unwrap().focus_calls(), 1);
}

#[test]
fn test_terminal_custom_cwd() {
    let mut fx = Fixture::new();
    fx.workspace.open_terminal(OpenTerminalOptions {
        path: Some(PathBuf::from("/project/sub")),
        focus: false,
    });
    fx.settle();

    let id = fx.terminal_ids()[0].clone();
    assert_eq!(fx.workspace.state().terminal(&id).unwrap().cwd(), Path::new("/project/sub"));
    assert_eq!(fx.transport.probe(&id).unwrap().focus_calls(), 0);
}

#[test]
fn test_closing_terminal_terminates_and_new_one_gets_new_id() {
    let mut fx = Fixture::new();
    let first = fx.open_terminal();
    let probe = fx.transport.probe(&first).unwrap();

    fx.workspace.apply(Msg::CloseTab(TabKey::terminal(&first)));
    assert_eq!(probe.terminate_calls(), 1);
    assert!(fx.workspace.state().terminal(&first).is_none());

    let second = fx.open_terminal();
    assert_ne!(first, second);
}

#[test]
fn test_terminals_have_independent_status() {
    let mut fx = Fixture::with_transport(MemoryTransport::manual());
    let a = fx.open_terminal();
    let b = fx.open_terminal();

    fx.transport
        .emit_status(&a, TerminalStatus::Error, Some("socket closed".into()));
    fx.transport.emit_status(&b, TerminalStatus::Connected, None);
    fx.settle();

    let state = fx.workspace.state();
    assert_eq!(state.terminal(&a).unwrap().status(), TerminalStatus::Error);
    assert_eq!(state.terminal(&a).unwrap().error(), Some("socket closed"));
    assert_eq!(state.terminal(&b).unwrap().status(), TerminalStatus::Connected);
    assert_eq!(state.terminal(&b).unwrap().error(), None);
}

#[test]
fn test_close_before_connect_is_an_error() {
    let mut fx = Fixture::with_transport(MemoryTransport::manual());
    let id = fx.open_terminal();

    fx.transport.emit_status(&id, TerminalStatus::Closed, None);
    fx.settle();

    let entry = fx.workspace.state().terminal(&id).unwrap();
    assert_eq!(entry.status(), TerminalStatus::Error);
    assert_eq!(entry.error(), Some(CLOSED_BEFORE_CONNECT));
}

#[test]
fn test_connect_failure_is_shown_on_that_terminal() {
    let mut fx = Fixture::new();
    fx.transport.fail_next("no pty available");
    let id = fx.open_terminal();

    let entry = fx.workspace.state().terminal(&id).unwrap();
    assert_eq!(entry.status(), TerminalStatus::Error);
    assert!(entry.error().unwrap().contains("no pty available"));
}

#[test]
fn test_restart_after_failed_connect_reconnects() {
    let mut fx = Fixture::new();
    fx.transport.fail_next("refused");
    let id = fx.open_terminal();
    assert_eq!(fx.workspace.state().terminal(&id).unwrap().status(), TerminalStatus::Error);

    fx.workspace.apply(Msg::RestartTerminal { id: id.clone() });
    fx.settle();

    let requests = fx.transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].id, id);
    assert_eq!(requests[1].cwd, PathBuf::from("/project"));

    let entry = fx.workspace.state().terminal(&id).unwrap();
    assert_eq!(entry.status(), TerminalStatus::Connected);
    assert!(entry.error().is_none());
    assert!(entry.is_attached());
}

#[test]
fn test_terminal_closed_before_connect_is_terminated() {
    let mut fx = Fixture::new();
    fx.workspace.open_terminal(OpenTerminalOptions::default());
    fx.workspace.pump();
    let id = fx.terminal_ids()[0].clone();

    fx.workspace.apply(Msg::CloseTab(TabKey::terminal(&id)));
    fx.settle();

    assert_eq!(fx.transport.probe(&id).unwrap().terminate_calls(), 1);
    assert!(fx.workspace.state().terminal(&id).is_none());
}

#[test]
fn test_write_restart_clear_and_output() {
    let mut fx = Fixture::new();
    let id = fx.open_terminal();
    let probe = fx.transport.probe(&id).unwrap();

    fx.workspace.apply(Msg::WriteTerminal {
        id: id.clone(),
        data: b"ls\n".to_vec(),
    });
    assert_eq!(probe.written(), b"ls\n");

    fx.transport.emit_output(&id, b"file.txt\n");
    fx.settle();
    assert_eq!(fx.workspace.take_terminal_output(&id), b"file.txt\n");

    fx.workspace.apply(Msg::ClearTerminal { id: id.clone() });
    assert_eq!(probe.clear_calls(), 1);

    fx.workspace.apply(Msg::RestartTerminal { id: id.clone() });
    assert_eq!(probe.restart_calls(), 1);
}

#[test]
fn test_output_in_background_marks_tab_unread() {
    let mut fx = Fixture::new();
    let id = fx.open_terminal();
    fx.open("a.txt");

    fx.transport.emit_output(&id, b"done\n");
    fx.settle();
    let key = TabKey::terminal(&id);
    let unread = |fx: &Fixture| {
        fx.workspace
            .state()
            .tabs()
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.unread)
    };
    assert_eq!(unread(&fx), Some(true));

    fx.workspace.apply(Msg::ActivateTab(key.clone()));
    assert_eq!(unread(&fx), Some(false));
}

#[test]
fn test_end_terminal_closes_its_tab() {
    let mut fx = Fixture::new();
    fx.open("a.txt");
    let id = fx.open_terminal();
    let probe = fx.transport.probe(&id).unwrap();

    fx.workspace.apply(Msg::EndTerminal { id: id.clone() });

    assert_eq!(probe.terminate_calls(), 1);
    assert_eq!(fx.keys(), vec!["file:a.txt"]);
    assert_eq!(fx.workspace.state().active(), &file_view("a.txt"));
}

#[test]
fn test_window_close_and_drop_terminate_all_sessions() {
    let mut fx = Fixture::new();
    let a = fx.open_terminal();
    let b = fx.open_terminal();
    let probes = [fx.transport.probe(&a).unwrap(), fx.transport.probe(&b).unwrap()];

    fx.workspace.on_window_close();
    for probe in &probes {
        assert_eq!(probe.terminate_calls(), 1);
    }

    let mut fx = Fixture::new();
    let c = fx.open_terminal();
    let probe = fx.transport.probe(&c).unwrap();
    drop(fx.workspace);
    assert_eq!(probe.terminate_calls(), 1);
}

// =============================================================================
// Project reset and controller
// =============================================================================

#[test]
fn test_reset_project_clears_all_stores() {
    let mut fx = Fixture::new();
    fx.open("a.txt");
    let id = fx.open_terminal();
    let probe = fx.transport.probe(&id).unwrap();

    fx.workspace.reset_project(ProjectContext::new("/elsewhere"));

    let state = fx.workspace.state();
    assert!(state.tabs().is_empty());
    assert_eq!(state.active(), &View::Empty);
    assert!(state.file_cache().is_empty());
    assert!(state.terminals().is_empty());
    assert_eq!(probe.terminate_calls(), 1);
    assert_eq!(state.project().workspace_path, PathBuf::from("/elsewhere"));
}

#[test]
fn test_reads_after_reset_use_new_root() {
    let mut fx = Fixture::new();
    fx.open("a.txt");
    fx.workspace.reset_project(ProjectContext::new("/elsewhere"));
    fx.open("a.txt");

    assert_eq!(
        fx.files.read_roots(Path::new("a.txt")),
        vec![PathBuf::from("/project"), PathBuf::from("/elsewhere")]
    );
}

#[test]
fn test_reset_drops_reads_started_before_it() {
    let mut fx = Fixture::new();
    fx.workspace.open_file(Path::new("a.txt"));
    fx.workspace.pump();
    fx.workspace.reset_project(ProjectContext::new("/elsewhere"));
    fx.workspace.open_file(Path::new("a.txt"));
    fx.workspace.pump();

    // Run only the read from the old project.
    assert!(fx.spawner.run_next());
    fx.workspace.pump();
    let preview = fx.workspace.state().file_preview(Path::new("a.txt")).unwrap();
    assert!(preview.loading);
    assert!(preview.content.is_none());

    fx.settle();
    let preview = fx.workspace.state().file_preview(Path::new("a.txt")).unwrap();
    assert_eq!(preview.content.as_deref(), Some("alpha"));
}

#[test]
fn test_controller_enqueues_from_another_thread() {
    let mut fx = Fixture::new();
    let controller = fx.workspace.controller();

    std::thread::spawn(move || {
        controller.open_file(Path::new("b.txt"));
        controller.open_project_summary();
    })
    .join()
    .unwrap();

    assert!(fx.workspace.state().tabs().is_empty());
    fx.settle();
    assert_eq!(fx.keys(), vec!["file:b.txt", "panel:project-summary"]);
    assert!(fx.workspace.controller().is_right_panel_open());
}
