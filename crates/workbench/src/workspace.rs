// Chunk: docs/chunks/workspace_core - Workspace owner and effect scheduling
//!
//! The workspace: owner of the state, the message queue and the services.
//!
//! Hosts (and sibling components, through [`WorkspaceController`]) enqueue
//! messages; the thread that owns the `Workspace` calls [`Workspace::pump`]
//! to run them through the reducer. Effects returned by the reducer are
//! handed to the [`Spawner`], and their results come back through the same
//! queue. Every terminal session is terminated when the workspace is torn
//! down or dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use workbench_input::PointerEvent;
use workbench_terminal::{TerminalEvent, TerminalEventSink, TerminalId, TerminalTransport};

use crate::config::WorkbenchConfig;
use crate::executor::Spawner;
use crate::facade::WorkspaceController;
use crate::msg::{Effect, Msg};
use crate::reducer::reduce;
use crate::services::{DiffService, FileService, ProjectContext};
use crate::state::WorkspaceState;

/// The collaborators a workspace calls.
#[derive(Clone)]
pub struct WorkspaceServices {
    pub files: Arc<dyn FileService>,
    pub diffs: Arc<dyn DiffService>,
    pub terminals: Arc<dyn TerminalTransport>,
}

pub struct Workspace {
    state: WorkspaceState,
    services: WorkspaceServices,
    spawner: Arc<dyn Spawner>,
    tx: Sender<Msg>,
    rx: Receiver<Msg>,
    /// Mirror of `state.right_panel_open` readable from controllers.
    right_panel_open: Arc<AtomicBool>,
}

impl Workspace {
    pub fn new(
        project: ProjectContext,
        config: WorkbenchConfig,
        services: WorkspaceServices,
        spawner: Arc<dyn Spawner>,
    ) -> Self {
        let (tx, rx) = unbounded();
        tracing::info!(workspace = %project.workspace_path.display(), "workspace created");
        Self {
            state: WorkspaceState::new(project, config),
            services,
            spawner,
            tx,
            rx,
            right_panel_open: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    /// A cloneable handle for sibling components.
    pub fn controller(&self) -> WorkspaceController {
        WorkspaceController::new(self.tx.clone(), Arc::clone(&self.right_panel_open))
    }

    /// Enqueues a message. It takes effect on the next [`Self::pump`].
    pub fn dispatch(&self, msg: Msg) {
        let _ = self.tx.send(msg);
    }

    /// Enqueues a message and pumps the queue.
    pub fn apply(&mut self, msg: Msg) -> usize {
        self.dispatch(msg);
        self.pump()
    }

    /// Runs every queued message through the reducer. Returns how many ran.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(msg) = self.rx.try_recv() {
            self.handle(msg);
            handled += 1;
        }
        handled
    }

    /// Waits up to `timeout` for one message, then pumps the rest.
    pub fn pump_timeout(&mut self, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => {
                self.handle(msg);
                1 + self.pump()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    fn handle(&mut self, msg: Msg) {
        tracing::trace!(?msg, "reduce");
        let effects = reduce(&mut self.state, msg);
        self.right_panel_open
            .store(self.state.right_panel_open, Ordering::Release);
        for effect in effects {
            self.schedule(effect);
        }
    }

    fn schedule(&self, effect: Effect) {
        let generation = self.state.generation;
        let tx = self.tx.clone();

        match effect {
            Effect::ReadFile { root, path } => {
                let files = Arc::clone(&self.services.files);
                self.spawner.spawn(Box::new(move || {
                    let result = files.read(&root, &path).map_err(|err| err.to_string());
                    let _ = tx.send(Msg::FileLoaded {
                        generation,
                        path,
                        result,
                    });
                }));
            }
            Effect::LoadDiff { root, file, staged } => {
                let diffs = Arc::clone(&self.services.diffs);
                self.spawner.spawn(Box::new(move || {
                    let result = diffs.diff(&root, &file, staged).map_err(|err| err.to_string());
                    let _ = tx.send(Msg::DiffLoaded {
                        generation,
                        file,
                        staged,
                        result,
                    });
                }));
            }
            Effect::WriteFile { root, path, text } => {
                let files = Arc::clone(&self.services.files);
                self.spawner.spawn(Box::new(move || {
                    let result = files.write(&root, &path, &text).map_err(|err| err.to_string());
                    let _ = tx.send(Msg::FileSaved {
                        generation,
                        path,
                        text,
                        result,
                    });
                }));
            }
            Effect::ConnectTerminal { request } => {
                let transport = Arc::clone(&self.services.terminals);
                let events_tx = tx.clone();
                let sink: Arc<dyn TerminalEventSink> = Arc::new(move |event: TerminalEvent| {
                    let _ = events_tx.send(Msg::Terminal(event));
                });
                self.spawner.spawn(Box::new(move || {
                    let id = request.id.clone();
                    let result = transport.connect(request, sink).map_err(|err| err.to_string());
                    let _ = tx.send(Msg::TerminalConnected {
                        generation,
                        id,
                        result,
                    });
                }));
            }
        }
    }

    // =========================================================================
    // Host hooks
    // =========================================================================

    /// Forwards a pointer event on the file-tree divider.
    pub fn file_tree_pointer(&mut self, event: &PointerEvent, container_width: f64) -> bool {
        self.state.file_tree.handle(event, container_width)
    }

    /// Forwards a pointer event on the chat/canvas divider.
    pub fn split_pointer(&mut self, event: &PointerEvent, container_width: f64) -> bool {
        self.state.split.handle(event, container_width)
    }

    pub(crate) fn set_layout(&mut self, file_tree_width: f64, split_ratio: f64) {
        self.state.file_tree.set_width(file_tree_width);
        self.state.split.set_ratio(split_ratio);
    }

    /// Drains buffered output of a terminal.
    pub fn take_terminal_output(&mut self, id: &TerminalId) -> Vec<u8> {
        self.state.terminals.take_output(id)
    }

    /// Switches to another project, dropping all tabs and sessions.
    pub fn reset_project(&mut self, project: ProjectContext) {
        self.apply(Msg::ResetProject {
            workspace_path: project.workspace_path,
        });
    }

    /// Window or host process is closing.
    pub fn on_window_close(&mut self) {
        self.apply(Msg::Teardown);
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let terminated = self.state.terminals.terminate_all();
        if terminated > 0 {
            tracing::info!(terminated, "terminals terminated on workspace drop");
        }
    }
}
