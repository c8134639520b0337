// Chunk: docs/chunks/terminal_registry - Transport seam for terminal sessions
//!
//! The workspace never interprets the terminal byte stream. It asks a
//! `TerminalTransport` to establish a session for an id and working
//! directory, stores the returned `TerminalSession` handle, and listens for
//! `TerminalEvent`s on a sink it hands to the transport.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::id::TerminalId;
use crate::status::TerminalStatus;

/// Errors raised by terminal transports.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to spawn terminal: {0}")]
    Spawn(String),
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("terminal session is closed")]
    Closed,
}

/// Events a transport reports back to the owner of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    /// Connection status changed.
    Status {
        id: TerminalId,
        status: TerminalStatus,
        error: Option<String>,
    },
    /// New output is waiting in the session's buffer.
    Activity { id: TerminalId },
}

impl TerminalEvent {
    pub fn id(&self) -> &TerminalId {
        match self {
            TerminalEvent::Status { id, .. } | TerminalEvent::Activity { id } => id,
        }
    }
}

/// Destination for transport events. Called from transport threads.
pub trait TerminalEventSink: Send + Sync {
    fn send(&self, event: TerminalEvent);
}

impl<F> TerminalEventSink for F
where
    F: Fn(TerminalEvent) + Send + Sync,
{
    fn send(&self, event: TerminalEvent) {
        self(event)
    }
}

/// Parameters for establishing a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    /// Multiplexing key for the session.
    pub id: TerminalId,
    /// Working directory, fixed for the session's lifetime.
    pub cwd: PathBuf,
    pub cols: u16,
    pub rows: u16,
}

/// Control surface of a live terminal session.
pub trait TerminalSession: Send {
    /// Gives the session keyboard focus in the host.
    fn focus(&mut self);

    /// Tears the session down and reconnects with the same id and cwd.
    fn restart(&mut self) -> Result<(), TransportError>;

    /// Tears the session down. Must be idempotent.
    fn terminate(&mut self);

    /// Resets the visual buffer without reconnecting.
    fn clear(&mut self);

    /// Writes input bytes to the session.
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Takes any buffered output bytes.
    fn take_output(&mut self) -> Vec<u8> {
        Vec::new()
    }
}

/// Establishes terminal sessions.
pub trait TerminalTransport: Send + Sync {
    fn connect(
        &self,
        request: ConnectRequest,
        events: std::sync::Arc<dyn TerminalEventSink>,
    ) -> Result<Box<dyn TerminalSession>, TransportError>;
}
