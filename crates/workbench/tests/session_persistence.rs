//! Session save / restore through a real workspace.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use workbench::session::{load_session_from, save_session_to};
use workbench::{
    ManualSpawner, MemoryDiffService, MemoryFileService, OpenTerminalOptions, ProjectContext, SessionData,
    TabData, TabKey, View, WorkbenchConfig, Workspace, WorkspaceFacade, WorkspaceServices,
};
use workbench_input::{PointerEvent, PointerId};
use workbench_terminal::MemoryTransport;

fn workspace(root: &str, spawner: &ManualSpawner) -> Workspace {
    let services = WorkspaceServices {
        files: Arc::new(
            MemoryFileService::new()
                .with_file("a.txt", "alpha")
                .with_file("b.txt", "beta"),
        ),
        diffs: Arc::new(MemoryDiffService::new().with_diff("b.txt", true, "+b\n")),
        terminals: Arc::new(MemoryTransport::new()),
    };
    Workspace::new(
        ProjectContext::new(root),
        WorkbenchConfig::default(),
        services,
        Arc::new(spawner.clone()),
    )
}

fn settle(workspace: &mut Workspace, spawner: &ManualSpawner) {
    loop {
        workspace.pump();
        if spawner.run_pending() == 0 {
            workspace.pump();
            break;
        }
    }
}

fn keys(workspace: &Workspace) -> Vec<String> {
    workspace.state().tabs().iter().map(|t| t.key.to_string()).collect()
}

#[test]
fn test_round_trip_restores_tabs_active_and_layout() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("session.json");

    let spawner = ManualSpawner::new();
    let mut original = workspace("/w", &spawner);
    original.open_file(Path::new("a.txt"));
    original.open_diff(Path::new("b.txt"), true);
    original.open_terminal(OpenTerminalOptions::default());
    original.open_project_summary();
    settle(&mut original, &spawner);
    original.dispatch(workbench::Msg::ActivateTab(TabKey::diff(Path::new("b.txt"), true)));
    settle(&mut original, &spawner);

    // Drag the file tree 40px wider.
    let container = 1600.0;
    original.file_tree_pointer(&PointerEvent::down(280.0).with_pointer(PointerId(1)), container);
    original.file_tree_pointer(&PointerEvent::moved(320.0).with_pointer(PointerId(1)), container);
    original.file_tree_pointer(&PointerEvent::up(320.0).with_pointer(PointerId(1)), container);

    save_session_to(&path, &SessionData::from_workspace(&original)).unwrap();
    let saved = load_session_from(&path).unwrap().unwrap();
    assert_eq!(saved.tabs.len(), 3);
    assert!(saved
        .tabs
        .iter()
        .all(|tab| matches!(tab, TabData::File { .. } | TabData::Diff { .. } | TabData::Panel { .. })));

    let restore_spawner = ManualSpawner::new();
    let mut restored = workspace("/w", &restore_spawner);
    assert!(restored.restore_session(saved));
    settle(&mut restored, &restore_spawner);

    assert_eq!(
        keys(&restored),
        vec!["file:a.txt", "diff:staged:b.txt", "panel:project-summary"]
    );
    assert_eq!(
        restored.state().active(),
        &View::Diff {
            file: PathBuf::from("b.txt"),
            staged: true
        }
    );
    assert!(restored.state().terminals().is_empty());
    assert!((restored.state().file_tree().raw_width() - 320.0).abs() < 1e-9);

    // The restored active diff is fetched.
    let diff = restored.state().diff_preview(Path::new("b.txt"), true).unwrap();
    assert_eq!(diff.diff.as_deref(), Some("+b\n"));
}

#[test]
fn test_active_terminal_falls_back_on_restore() {
    let spawner = ManualSpawner::new();
    let mut original = workspace("/w", &spawner);
    original.open_file(Path::new("a.txt"));
    original.open_terminal(OpenTerminalOptions::default());
    settle(&mut original, &spawner);
    assert!(matches!(original.state().active(), View::Terminal { .. }));

    let session = SessionData::from_workspace(&original);
    let mut restored = workspace("/w", &spawner);
    assert!(restored.restore_session(session));
    settle(&mut restored, &spawner);

    assert_eq!(keys(&restored), vec!["file:a.txt"]);
    assert_eq!(
        restored.state().active(),
        &View::File {
            path: PathBuf::from("a.txt")
        }
    );
}

#[test]
fn test_session_for_other_workspace_is_ignored() {
    let spawner = ManualSpawner::new();
    let mut original = workspace("/one", &spawner);
    original.open_file(Path::new("a.txt"));
    settle(&mut original, &spawner);

    let mut other = workspace("/two", &spawner);
    assert!(!other.restore_session(SessionData::from_workspace(&original)));
    settle(&mut other, &spawner);
    assert!(other.state().tabs().is_empty());
    assert_eq!(other.state().active(), &View::Empty);
}
