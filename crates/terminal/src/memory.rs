// Chunk: docs/chunks/terminal_registry - In-memory transport
//!
//! In-memory terminal transport for headless hosts and tests.
//!
//! `MemoryTransport` records every connect request and hands out
//! `MemorySession`s whose calls are observable through a `SessionProbe`.
//! Status and activity events can be injected per id to drive the owner's
//! state machine without a real process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::id::TerminalId;
use crate::status::TerminalStatus;
use crate::transport::{
    ConnectRequest, TerminalEvent, TerminalEventSink, TerminalSession, TerminalTransport, TransportError,
};

#[derive(Debug, Default)]
struct SessionCounters {
    focus: usize,
    restart: usize,
    terminate: usize,
    clear: usize,
    written: Vec<u8>,
    output: Vec<u8>,
    terminated: bool,
}

fn lock(counters: &Mutex<SessionCounters>) -> MutexGuard<'_, SessionCounters> {
    // Counters stay meaningful even if a test thread panicked mid-update
    counters.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Observer for the calls made on a `MemorySession`.
#[derive(Debug, Clone, Default)]
pub struct SessionProbe {
    counters: Arc<Mutex<SessionCounters>>,
}

impl SessionProbe {
    pub fn focus_calls(&self) -> usize {
        lock(&self.counters).focus
    }

    pub fn restart_calls(&self) -> usize {
        lock(&self.counters).restart
    }

    pub fn terminate_calls(&self) -> usize {
        lock(&self.counters).terminate
    }

    pub fn clear_calls(&self) -> usize {
        lock(&self.counters).clear
    }

    /// All bytes written to the session so far.
    pub fn written(&self) -> Vec<u8> {
        lock(&self.counters).written.clone()
    }

    /// Queues output for the session to hand out from `take_output`.
    pub fn push_output(&self, bytes: &[u8]) {
        lock(&self.counters).output.extend_from_slice(bytes);
    }
}

/// A terminal session that only records what is asked of it.
#[derive(Debug)]
pub struct MemorySession {
    counters: Arc<Mutex<SessionCounters>>,
}

impl MemorySession {
    pub fn new() -> (Self, SessionProbe) {
        let probe = SessionProbe::default();
        let session = Self {
            counters: Arc::clone(&probe.counters),
        };
        (session, probe)
    }
}

impl TerminalSession for MemorySession {
    fn focus(&mut self) {
        lock(&self.counters).focus += 1;
    }

    fn restart(&mut self) -> Result<(), TransportError> {
        let mut counters = lock(&self.counters);
        counters.restart += 1;
        counters.terminated = false;
        Ok(())
    }

    fn terminate(&mut self) {
        let mut counters = lock(&self.counters);
        counters.terminate += 1;
        counters.terminated = true;
    }

    fn clear(&mut self) {
        lock(&self.counters).clear += 1;
    }

    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let mut counters = lock(&self.counters);
        if counters.terminated {
            return Err(TransportError::Closed);
        }
        counters.written.extend_from_slice(data);
        Ok(())
    }

    fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut lock(&self.counters).output)
    }
}

#[derive(Default)]
struct TransportState {
    requests: Vec<ConnectRequest>,
    probes: HashMap<TerminalId, SessionProbe>,
    sinks: HashMap<TerminalId, Arc<dyn TerminalEventSink>>,
    fail_next: Option<String>,
}

/// Transport that connects instantly to in-memory sessions.
pub struct MemoryTransport {
    state: Mutex<TransportState>,
    /// Report `Connected` as soon as a session is created.
    auto_connect: bool,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    /// Creates a transport that reports `Connected` on every connect.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TransportState::default()),
            auto_connect: true,
        }
    }

    /// Creates a transport that leaves sessions `Connecting` until an event
    /// is injected with `emit_status`.
    pub fn manual() -> Self {
        Self {
            state: Mutex::new(TransportState::default()),
            auto_connect: false,
        }
    }

    fn state(&self) -> MutexGuard<'_, TransportState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes the next connect fail with the given message.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.state().fail_next = Some(message.into());
    }

    pub fn connect_calls(&self) -> usize {
        self.state().requests.len()
    }

    pub fn requests(&self) -> Vec<ConnectRequest> {
        self.state().requests.clone()
    }

    /// Probe for the session created for `id`, if one was created.
    pub fn probe(&self, id: &TerminalId) -> Option<SessionProbe> {
        self.state().probes.get(id).cloned()
    }

    /// Injects a status event for `id`. Returns false if `id` never connected.
    pub fn emit_status(&self, id: &TerminalId, status: TerminalStatus, error: Option<String>) -> bool {
        let sink = self.state().sinks.get(id).cloned();
        match sink {
            Some(sink) => {
                sink.send(TerminalEvent::Status {
                    id: id.clone(),
                    status,
                    error,
                });
                true
            }
            None => false,
        }
    }

    /// Queues output on the session and reports activity for it.
    pub fn emit_output(&self, id: &TerminalId, bytes: &[u8]) -> bool {
        let (sink, probe) = {
            let state = self.state();
            (state.sinks.get(id).cloned(), state.probes.get(id).cloned())
        };
        match (sink, probe) {
            (Some(sink), Some(probe)) => {
                probe.push_output(bytes);
                sink.send(TerminalEvent::Activity { id: id.clone() });
                true
            }
            _ => false,
        }
    }
}

impl TerminalTransport for MemoryTransport {
    fn connect(
        &self,
        request: ConnectRequest,
        events: Arc<dyn TerminalEventSink>,
    ) -> Result<Box<dyn TerminalSession>, TransportError> {
        let id = request.id.clone();
        {
            let mut state = self.state();
            state.requests.push(request);
            if let Some(message) = state.fail_next.take() {
                return Err(TransportError::Spawn(message));
            }
        }

        let (session, probe) = MemorySession::new();
        {
            let mut state = self.state();
            state.probes.insert(id.clone(), probe);
            state.sinks.insert(id.clone(), Arc::clone(&events));
        }
        if self.auto_connect {
            events.send(TerminalEvent::Status {
                id,
                status: TerminalStatus::Connected,
                error: None,
            });
        }
        Ok(Box::new(session))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn request(id: &str) -> ConnectRequest {
        ConnectRequest {
            id: TerminalId::new(id),
            cwd: PathBuf::from("/tmp"),
            cols: 80,
            rows: 24,
        }
    }

    fn collecting_sink() -> (Arc<dyn TerminalEventSink>, Arc<Mutex<Vec<TerminalEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&events);
        let sink: Arc<dyn TerminalEventSink> = Arc::new(move |event: TerminalEvent| {
            captured.lock().unwrap().push(event);
        });
        (sink, events)
    }

    #[test]
    fn test_connect_reports_connected() {
        let transport = MemoryTransport::new();
        let (sink, events) = collecting_sink();

        transport.connect(request("a"), sink).unwrap();

        assert_eq!(transport.connect_calls(), 1);
        let events = events.lock().unwrap();
        assert_eq!(
            events.as_slice(),
            &[TerminalEvent::Status {
                id: TerminalId::new("a"),
                status: TerminalStatus::Connected,
                error: None,
            }]
        );
    }

    #[test]
    fn test_manual_transport_stays_silent() {
        let transport = MemoryTransport::manual();
        let (sink, events) = collecting_sink();
        transport.connect(request("a"), sink).unwrap();
        assert!(events.lock().unwrap().is_empty());

        assert!(transport.emit_status(&TerminalId::new("a"), TerminalStatus::Connected, None));
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_fail_next() {
        let transport = MemoryTransport::new();
        transport.fail_next("no pty");
        let (sink, _) = collecting_sink();

        let result = transport.connect(request("a"), Arc::clone(&sink));
        assert!(matches!(result, Err(TransportError::Spawn(ref m)) if m == "no pty"));
        assert!(transport.connect(request("b"), sink).is_ok());
    }

    #[test]
    fn test_write_after_terminate_fails() {
        let (mut session, probe) = MemorySession::new();
        session.write(b"a").unwrap();
        session.terminate();
        assert!(session.write(b"b").is_err());
        assert_eq!(probe.written(), b"a".to_vec());
    }

    #[test]
    fn test_emit_output_buffers_bytes() {
        let transport = MemoryTransport::manual();
        let (sink, events) = collecting_sink();
        let mut session = transport.connect(request("a"), sink).unwrap();

        assert!(transport.emit_output(&TerminalId::new("a"), b"hi"));
        assert_eq!(session.take_output(), b"hi".to_vec());
        assert!(session.take_output().is_empty());
        assert!(matches!(events.lock().unwrap()[0], TerminalEvent::Activity { .. }));
    }
}
