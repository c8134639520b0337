// Chunk: docs/chunks/terminal_registry - Terminal session registry
//!
//! Map from terminal id to its live session handle and connection status.
//!
//! An entry is created as soon as a terminal tab opens, before any session
//! exists. The handle is attached later, once the transport has connected.
//! Removing an entry always terminates its handle, and dropping the registry
//! terminates every handle it still owns, so backend processes cannot leak
//! past the owner.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::id::TerminalId;
use crate::status::{StatusMachine, TerminalStatus};
use crate::transport::{TerminalSession, TransportError};

/// Registry entry for one terminal.
pub struct TerminalEntry {
    cwd: PathBuf,
    handle: Option<Box<dyn TerminalSession>>,
    status: StatusMachine,
    /// Focus was requested before the handle was attached.
    pending_focus: bool,
}

impl TerminalEntry {
    fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            handle: None,
            status: StatusMachine::new(),
            pending_focus: false,
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn status(&self) -> TerminalStatus {
        self.status.status()
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error()
    }

    /// Returns true once a session handle has been attached.
    pub fn is_attached(&self) -> bool {
        self.handle.is_some()
    }

    /// Terminates and drops the handle, so a session is never terminated twice.
    fn terminate(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.terminate();
        }
        self.pending_focus = false;
        self.status.terminate();
    }
}

impl std::fmt::Debug for TerminalEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalEntry")
            .field("cwd", &self.cwd)
            .field("status", &self.status)
            .field("attached", &self.handle.is_some())
            .finish_non_exhaustive()
    }
}

/// How [`TerminalRegistry::restart`] handled a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartOutcome {
    /// The attached session restarted itself.
    InPlace,
    /// No session is attached; connect again in `cwd`.
    Reconnect { cwd: PathBuf },
    /// A connect is already under way.
    Pending,
}

/// Owns every terminal session of one workspace.
#[derive(Debug, Default)]
pub struct TerminalRegistry {
    entries: HashMap<TerminalId, TerminalEntry>,
}

impl TerminalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a terminal in the `Connecting` state.
    ///
    /// Returns false if the id is already registered.
    pub fn insert(&mut self, id: TerminalId, cwd: PathBuf) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, TerminalEntry::new(cwd));
        true
    }

    pub fn contains(&self, id: &TerminalId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &TerminalId) -> Option<&TerminalEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &TerminalId> {
        self.entries.keys()
    }

    /// Attaches a connected session handle to its entry.
    ///
    /// If the entry is gone (its tab closed while the transport was still
    /// connecting), the handle is terminated on the spot and false is returned.
    pub fn attach(&mut self, id: &TerminalId, mut handle: Box<dyn TerminalSession>) -> bool {
        let Some(entry) = self.entries.get_mut(id) else {
            tracing::info!(terminal = %id, "terminating session for closed terminal");
            handle.terminate();
            return false;
        };
        if let Some(mut previous) = entry.handle.take() {
            previous.terminate();
        }
        if entry.pending_focus {
            handle.focus();
            entry.pending_focus = false;
        }
        entry.handle = Some(handle);
        true
    }

    /// Records a status report from the transport.
    pub fn apply_status(&mut self, id: &TerminalId, status: TerminalStatus, error: Option<String>) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) => entry.status.apply(status, error),
            None => false,
        }
    }

    /// Records that the transport could not establish the session.
    pub fn connect_failed(&mut self, id: &TerminalId, message: String) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) => entry.status.on_error(message),
            None => false,
        }
    }

    /// Focuses the session, or remembers the request until it is attached.
    pub fn focus(&mut self, id: &TerminalId) {
        if let Some(entry) = self.entries.get_mut(id) {
            match entry.handle.as_mut() {
                Some(handle) => handle.focus(),
                None => entry.pending_focus = true,
            }
        }
    }

    /// Restarts the session with the same id and cwd.
    ///
    /// An attached session restarts in place. Without one (the connect
    /// failed, or the session was terminated) the status goes back to
    /// `Connecting` and the caller must connect again in the returned cwd.
    pub fn restart(&mut self, id: &TerminalId) -> Result<RestartOutcome, TransportError> {
        let entry = self.entries.get_mut(id).ok_or(TransportError::Closed)?;
        if entry.handle.is_none() {
            if entry.status.status() == TerminalStatus::Connecting {
                return Ok(RestartOutcome::Pending);
            }
            entry.status.reset();
            return Ok(RestartOutcome::Reconnect {
                cwd: entry.cwd.clone(),
            });
        }

        entry.status.reset();
        if let Some(handle) = entry.handle.as_mut() {
            if let Err(err) = handle.restart() {
                entry.status.on_error(err.to_string());
                return Err(err);
            }
        }
        Ok(RestartOutcome::InPlace)
    }

    /// Clears the session's visual buffer.
    pub fn clear(&mut self, id: &TerminalId) {
        if let Some(handle) = self.entries.get_mut(id).and_then(|e| e.handle.as_mut()) {
            handle.clear();
        }
    }

    /// Writes input bytes to the session.
    pub fn write(&mut self, id: &TerminalId, data: &[u8]) -> Result<(), TransportError> {
        let handle = self
            .entries
            .get_mut(id)
            .and_then(|e| e.handle.as_mut())
            .ok_or(TransportError::Closed)?;
        handle.write(data)
    }

    /// Takes buffered output from the session.
    pub fn take_output(&mut self, id: &TerminalId) -> Vec<u8> {
        self.entries
            .get_mut(id)
            .and_then(|e| e.handle.as_mut())
            .map(|h| h.take_output())
            .unwrap_or_default()
    }

    /// Terminates the session but keeps its entry (status becomes `Closed`).
    pub fn terminate(&mut self, id: &TerminalId) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.terminate();
        }
    }

    /// Terminates the session and removes its entry.
    pub fn remove(&mut self, id: &TerminalId) -> bool {
        match self.entries.remove(id) {
            Some(mut entry) => {
                entry.terminate();
                tracing::info!(terminal = %id, "terminal removed");
                true
            }
            None => false,
        }
    }

    /// Terminates and removes every session. Returns how many were removed.
    pub fn terminate_all(&mut self) -> usize {
        let count = self.entries.len();
        for (id, mut entry) in self.entries.drain() {
            entry.terminate();
            tracing::debug!(terminal = %id, "terminal terminated during teardown");
        }
        count
    }
}

impl Drop for TerminalRegistry {
    fn drop(&mut self) {
        self.terminate_all();
    }
}

// =============================================================================
// Tests
// =============================================================================
