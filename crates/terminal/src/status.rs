// Chunk: docs/chunks/terminal_registry - Per-terminal connection status
//!
//! Connection status state machine for a single terminal session.
//!
//! ```text
//! Connecting ──(connected)──> Connected ──(closed)──> Closed
//!     │                          │
//!     └──────(error | closed)────┴──────(error)─────> Error
//!
//! any ──(terminate)──> Closed        any ──(restart)──> Connecting
//! ```
//!
//! A transport reporting `Closed` before it ever reported `Connected` is a
//! failed connect, so it lands in `Error`. Only `terminate` closes a session
//! that never connected.
//!
//! The machine is pure: transports report raw `(status, error)` pairs and the
//! machine decides whether they are legal transitions. This keeps a late
//! transport callback from resurrecting a session the user already ended.

/// Error recorded when a session closes before it connected.
pub const CLOSED_BEFORE_CONNECT: &str = "session closed before it connected";

/// Connection status of a terminal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminalStatus {
    /// Transport is being established.
    #[default]
    Connecting,
    /// Duplex stream is up.
    Connected,
    /// Session ended normally or was terminated by the user.
    Closed,
    /// Transport failed.
    Error,
}

impl TerminalStatus {
    /// Returns true once the session can no longer produce output.
    pub fn is_finished(&self) -> bool {
        matches!(self, TerminalStatus::Closed | TerminalStatus::Error)
    }

    /// Short label for status bars.
    pub fn label(&self) -> &'static str {
        match self {
            TerminalStatus::Connecting => "connecting",
            TerminalStatus::Connected => "connected",
            TerminalStatus::Closed => "closed",
            TerminalStatus::Error => "error",
        }
    }
}

/// Pure state machine tracking one terminal's status and last error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusMachine {
    status: TerminalStatus,
    error: Option<String>,
}

impl StatusMachine {
    /// Creates a machine in the `Connecting` state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> TerminalStatus {
        self.status
    }

    /// The last error reported for this session, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Applies a status report from the transport.
    ///
    /// Returns true if the report changed the machine.
    pub fn apply(&mut self, status: TerminalStatus, error: Option<String>) -> bool {
        match status {
            TerminalStatus::Connecting => false,
            TerminalStatus::Connected => self.on_connected(),
            TerminalStatus::Closed => self.on_closed(),
            TerminalStatus::Error => {
                self.on_error(error.unwrap_or_else(|| "terminal transport error".to_string()))
            }
        }
    }

    /// Connecting → Connected.
    pub fn on_connected(&mut self) -> bool {
        if self.status != TerminalStatus::Connecting {
            return false;
        }
        self.status = TerminalStatus::Connected;
        self.error = None;
        true
    }

    /// Connected → Closed. A close while still connecting is an error.
    pub fn on_closed(&mut self) -> bool {
        match self.status {
            TerminalStatus::Connected => {
                self.status = TerminalStatus::Closed;
                true
            }
            TerminalStatus::Connecting => self.on_error(CLOSED_BEFORE_CONNECT.to_string()),
            TerminalStatus::Closed | TerminalStatus::Error => false,
        }
    }

    /// Connecting | Connected → Error.
    pub fn on_error(&mut self, message: String) -> bool {
        match self.status {
            TerminalStatus::Connecting | TerminalStatus::Connected => {
                self.status = TerminalStatus::Error;
                self.error = Some(message);
                true
            }
            // A fault after the user ended the session is noise
            TerminalStatus::Closed | TerminalStatus::Error => false,
        }
    }

    /// Forced termination from any state. Keeps the last error for display.
    pub fn terminate(&mut self) {
        self.status = TerminalStatus::Closed;
    }

    /// Restart: back to `Connecting` with the error cleared.
    pub fn reset(&mut self) {
        self.status = TerminalStatus::Connecting;
        self.error = None;
    }
}

// =============================================================================
// Tests
// =============================================================================
