// Chunk: docs/chunks/terminal_pty_transport - PTY-backed terminal transport
//!
//! PTY spawning and I/O thread management.
//!
//! `PtyTransport` runs the session's shell in a local PTY. Output is read on a
//! background thread and forwarded through a crossbeam channel; the session's
//! event sink is told about activity, normal exit (`Closed`) and read
//! failures (`Error`).
//!
//! Each spawned process carries a `silenced` flag. Terminate and restart set
//! it before killing the child so the dying reader thread cannot report a
//! stale `Closed` over the replacement process.

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver};
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};

use crate::status::TerminalStatus;
use crate::transport::{
    ConnectRequest, TerminalEvent, TerminalEventSink, TerminalSession, TerminalTransport, TransportError,
};

/// What to run inside each PTY.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PtyCommand {
    /// Program to run. `None` spawns the user's login shell.
    pub program: Option<String>,
    /// Arguments for `program`. Ignored for the login shell.
    pub args: Vec<String>,
}

/// Transport that spawns a local process per terminal.
#[derive(Debug, Clone, Default)]
pub struct PtyTransport {
    command: PtyCommand,
}

impl PtyTransport {
    /// Spawns the user's login shell for every session.
    pub fn login_shell() -> Self {
        Self::default()
    }

    /// Spawns `program` (with no arguments) for every session.
    pub fn with_shell(program: impl Into<String>) -> Self {
        Self {
            command: PtyCommand {
                program: Some(program.into()),
                args: Vec::new(),
            },
        }
    }

    /// Spawns `program` with `args` for every session.
    pub fn with_command(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: PtyCommand {
                program: Some(program.into()),
                args,
            },
        }
    }
}

impl TerminalTransport for PtyTransport {
    fn connect(
        &self,
        request: ConnectRequest,
        events: Arc<dyn TerminalEventSink>,
    ) -> Result<Box<dyn TerminalSession>, TransportError> {
        let process = PtyProcess::spawn(&self.command, &request, Arc::clone(&events))?;
        tracing::info!(terminal = %request.id, cwd = %request.cwd.display(), "pty session started");
        Ok(Box::new(PtySession {
            command: self.command.clone(),
            request,
            events,
            process: Some(process),
        }))
    }
}

/// One running child process in a PTY.
struct PtyProcess {
    /// Kept alive so the PTY stays open.
    _master: Box<dyn MasterPty + Send>,
    /// Writer instance for sending input to the PTY.
    /// Taken from master once at creation time.
    writer: Box<dyn Write + Send>,
    child: Box<dyn Child + Send + Sync>,
    output_rx: Receiver<Vec<u8>>,
    silenced: Arc<AtomicBool>,
    reader_thread: Option<JoinHandle<()>>,
}

impl PtyProcess {
    fn spawn(
        command: &PtyCommand,
        request: &ConnectRequest,
        events: Arc<dyn TerminalEventSink>,
    ) -> Result<Self, TransportError> {
        let pty_system = native_pty_system();

        let size = PtySize {
            rows: request.rows,
            cols: request.cols,
            pixel_width: 0,
            pixel_height: 0,
        };

        let pair = pty_system
            .openpty(size)
            .map_err(|e| TransportError::Spawn(e.to_string()))?;

        // Without an explicit program, new_default_prog() spawns the user's
        // shell as a login shell so the full profile chain is sourced.
        let mut cmd_builder = match &command.program {
            Some(program) => {
                let mut builder = CommandBuilder::new(program);
                builder.args(&command.args);
                builder
            }
            None => CommandBuilder::new_default_prog(),
        };
        cmd_builder.cwd(&request.cwd);
        cmd_builder.env("TERM", "xterm-256color");
        cmd_builder.env("COLORTERM", "truecolor");

        let child = pair
            .slave
            .spawn_command(cmd_builder)
            .map_err(|e| TransportError::Spawn(e.to_string()))?;

        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| TransportError::Spawn(e.to_string()))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| TransportError::Spawn(e.to_string()))?;

        let (output_tx, output_rx) = unbounded();
        let silenced = Arc::new(AtomicBool::new(false));
        let thread_silenced = Arc::clone(&silenced);
        let id = request.id.clone();

        // Connected must be queued before the reader can report an exit.
        events.send(TerminalEvent::Status {
            id: id.clone(),
            status: TerminalStatus::Connected,
            error: None,
        });

        let reader_thread = thread::spawn(move || {
            let mut buf = [0u8; 4096];
            let outcome = loop {
                match reader.read(&mut buf) {
                    Ok(0) => break None,
                    Ok(n) => {
                        if output_tx.send(buf[..n].to_vec()).is_err() {
                            // Session dropped
                            return;
                        }
                        if !thread_silenced.load(Ordering::SeqCst) {
                            events.send(TerminalEvent::Activity { id: id.clone() });
                        }
                    }
                    Err(e) => break Some(e.to_string()),
                }
            };
            if thread_silenced.load(Ordering::SeqCst) {
                return;
            }
            let (status, error) = match outcome {
                None => (TerminalStatus::Closed, None),
                Some(message) => (TerminalStatus::Error, Some(message)),
            };
            events.send(TerminalEvent::Status { id, status, error });
        });

        Ok(Self {
            _master: pair.master,
            writer,
            child,
            output_rx,
            silenced,
            reader_thread: Some(reader_thread),
        })
    }

    fn kill(&mut self) {
        self.silenced.store(true, Ordering::SeqCst);
        let _ = self.child.kill();
        // The reader thread may stay blocked on read() until the PTY closes
        // on some platforms, so it is detached rather than joined.
        self.reader_thread.take();
    }
}

impl Drop for PtyProcess {
    fn drop(&mut self) {
        self.kill();
    }
}

/// A terminal session backed by a local PTY.
pub struct PtySession {
    command: PtyCommand,
    request: ConnectRequest,
    events: Arc<dyn TerminalEventSink>,
    process: Option<PtyProcess>,
}

impl TerminalSession for PtySession {
    fn focus(&mut self) {
        // Focus is a host concern; the PTY has nothing to do.
        tracing::debug!(terminal = %self.request.id, "pty focus requested");
    }

    fn restart(&mut self) -> Result<(), TransportError> {
        if let Some(mut process) = self.process.take() {
            process.kill();
        }
        let process = PtyProcess::spawn(&self.command, &self.request, Arc::clone(&self.events))?;
        self.process = Some(process);
        tracing::info!(terminal = %self.request.id, "pty session restarted");
        Ok(())
    }

    fn terminate(&mut self) {
        if let Some(mut process) = self.process.take() {
            process.kill();
            tracing::info!(terminal = %self.request.id, "pty session terminated");
        }
    }

    fn clear(&mut self) {
        // Drop whatever output has not been handed out yet.
        if let Some(process) = self.process.as_ref() {
            while process.output_rx.try_recv().is_ok() {}
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let process = self.process.as_mut().ok_or(TransportError::Closed)?;
        process.writer.write_all(data)?;
        process.writer.flush()?;
        Ok(())
    }

    fn take_output(&mut self) -> Vec<u8> {
        let mut output = Vec::new();
        if let Some(process) = self.process.as_ref() {
            for chunk in process.output_rx.try_iter() {
                output.extend_from_slice(&chunk);
            }
        }
        output
    }
}
