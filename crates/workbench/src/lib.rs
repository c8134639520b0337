// Chunk: docs/chunks/workspace_core - Workspace view and tab manager
//! Workspace view and tab manager.
//!
//! A headless core that owns the open tabs (files, diffs, terminals and
//! static panels), the single active view, the preview caches feeding those
//! tabs, and the terminal sessions behind terminal tabs.
//!
//! # Architecture
//!
//! ```text
//! host / siblings ──Msg──▶ queue ──▶ reduce(state, msg) ──▶ Vec<Effect>
//!                            ▲                                  │
//!                            └──── completion Msg ◀── Spawner ◀─┘
//! ```
//!
//! - [`Workspace`] owns [`WorkspaceState`] and the queue. Only the owning
//!   thread mutates state, inside `pump`.
//! - [`WorkspaceController`] is the [`WorkspaceFacade`] handed to sibling
//!   components.
//! - File and diff reads go through [`FileService`] / [`DiffService`];
//!   terminals through `workbench_terminal::TerminalTransport`.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use std::sync::Arc;
//! use workbench::{
//!     ManualSpawner, MemoryDiffService, MemoryFileService, ProjectContext, View, WorkbenchConfig,
//!     Workspace, WorkspaceFacade, WorkspaceServices,
//! };
//! use workbench_terminal::MemoryTransport;
//!
//! let spawner = ManualSpawner::new();
//! let services = WorkspaceServices {
//!     files: Arc::new(MemoryFileService::new().with_file("README.md", "# hi")),
//!     diffs: Arc::new(MemoryDiffService::new()),
//!     terminals: Arc::new(MemoryTransport::new()),
//! };
//! let mut workspace = Workspace::new(
//!     ProjectContext::new("/project"),
//!     WorkbenchConfig::default(),
//!     services,
//!     Arc::new(spawner.clone()),
//! );
//!
//! workspace.open_file(Path::new("README.md"));
//! workspace.pump();
//! spawner.run_pending();
//! workspace.pump();
//!
//! assert!(matches!(workspace.state().active(), View::File { .. }));
//! let preview = workspace.state().file_preview(Path::new("README.md")).unwrap();
//! assert_eq!(preview.content.as_deref(), Some("# hi"));
//! ```

pub mod config;
mod draft;
mod error;
mod executor;
mod facade;
pub mod layout;
mod local;
mod memory;
mod msg;
mod preview;
mod reducer;
pub mod session;
mod services;
mod state;
mod tab;
mod tab_strip;
mod workspace;

pub use config::{ConfigError, WorkbenchConfig};
pub use draft::SaveRejected;
pub use error::ServiceError;
pub use executor::{ManualSpawner, Spawner, Task, ThreadPoolSpawner};
pub use facade::{OpenTerminalOptions, WorkspaceController, WorkspaceFacade};
pub use layout::{DragState, FileTreeResize, SplitResize};
pub use local::{GitCliDiffService, LocalFileService};
pub use memory::{MemoryDiffService, MemoryFileService};
pub use msg::{Effect, Msg};
pub use preview::{CacheEntry, DiffPreview, Ensure, FilePreview, PreviewCache};
pub use services::{DiffContent, DiffService, FileContent, FileService, ProjectContext};
pub use session::{SessionData, SessionError, TabData};
pub use state::WorkspaceState;
pub use tab::{diff_cache_key, file_cache_key, tab_label, PanelId, Tab, TabKey, TabKind, View};
pub use tab_strip::{OpenOutcome, OpenTab, TabStrip};
pub use workspace::{Workspace, WorkspaceServices};
