// Chunk: docs/chunks/terminal_registry - Terminal sessions for the workspace
//! Terminal session crate for workbench.
//!
//! This crate owns everything the workspace needs to multiplex several
//! terminals without interpreting their byte streams:
//!
//! - `TerminalId`: UUID v4 shaped ids that survive a missing entropy source
//! - `StatusMachine`: per-terminal `connecting → connected → closed/error`
//! - `TerminalTransport` / `TerminalSession`: the seam to whatever actually
//!   carries the bytes
//! - `TerminalRegistry`: id → session handle + status, terminating on removal
//! - `PtyTransport`: local PTY implementation
//! - `MemoryTransport`: in-memory implementation for headless hosts and tests
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use workbench_terminal::{
//!     ConnectRequest, PtyTransport, TerminalEvent, TerminalId, TerminalRegistry, TerminalTransport,
//! };
//!
//! let transport = PtyTransport::login_shell();
//! let mut registry = TerminalRegistry::new();
//! let id = TerminalId::generate();
//! registry.insert(id.clone(), PathBuf::from("/tmp"));
//!
//! let sink = Arc::new(|event: TerminalEvent| println!("{event:?}"));
//! let request = ConnectRequest { id: id.clone(), cwd: PathBuf::from("/tmp"), cols: 80, rows: 24 };
//! let session = transport.connect(request, sink).unwrap();
//! registry.attach(&id, session);
//! registry.write(&id, b"ls\n").unwrap();
//! registry.remove(&id);
//! ```

mod id;
pub mod memory;
mod pty;
mod registry;
mod status;
mod transport;

pub use id::TerminalId;
pub use memory::{MemorySession, MemoryTransport, SessionProbe};
pub use pty::{PtyCommand, PtySession, PtyTransport};
pub use registry::{RestartOutcome, TerminalEntry, TerminalRegistry};
pub use status::{StatusMachine, TerminalStatus, CLOSED_BEFORE_CONNECT};
pub use transport::{
    ConnectRequest, TerminalEvent, TerminalEventSink, TerminalSession, TerminalTransport, TransportError,
};
