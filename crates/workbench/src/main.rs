// Chunk: docs/chunks/workspace_core - Line-oriented workspace host
//! `workbench` binary: a line-oriented host for the workspace core.
//!
//! Reads one command per line from stdin, runs it through the workspace and
//! prints the tab strip plus the active view. Logs go to stderr, filtered by
//! `RUST_LOG` (default `info`).

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use workbench::session::{load_session, save_session};
use workbench::{
    GitCliDiffService, LocalFileService, Msg, OpenTerminalOptions, ProjectContext, SessionData, TabKey,
    ThreadPoolSpawner, View, WorkbenchConfig, Workspace, WorkspaceFacade, WorkspaceServices,
};
use workbench_terminal::{PtyTransport, TerminalId};

/// How long to wait for background completions after each command.
const SETTLE_TIMEOUT: Duration = Duration::from_millis(150);

/// Lines of file or diff content shown for the active view.
const PREVIEW_LINES: usize = 20;

#[derive(Parser)]
#[command(name = "workbench")]
#[command(about = "Workspace view and tab manager", long_about = None)]
struct Cli {
    /// Workspace directory (defaults to the current directory)
    path: Option<PathBuf>,

    /// Config file (defaults to <config_dir>/workbench/workbench.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not restore or save the session
    #[arg(long)]
    no_session: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => WorkbenchConfig::load(path)?,
        None => WorkbenchConfig::load_default()?,
    };

    let root = match cli.path {
        Some(path) => path,
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let root = root
        .canonicalize()
        .with_context(|| format!("workspace {} does not exist", root.display()))?;

    let transport = match &config.terminal.shell {
        Some(shell) => PtyTransport::with_shell(shell.clone()),
        None => PtyTransport::login_shell(),
    };
    let services = WorkspaceServices {
        files: Arc::new(LocalFileService::new(config.preview)),
        diffs: Arc::new(GitCliDiffService::new(&config.preview)),
        terminals: Arc::new(transport),
    };
    let mut workspace = Workspace::new(
        ProjectContext::new(&root),
        config,
        services,
        Arc::new(ThreadPoolSpawner::default()),
    );

    if !cli.no_session {
        match load_session() {
            Ok(Some(session)) => {
                workspace.restore_session(session);
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(%err, "could not load session"),
        }
    }

    settle(&mut workspace);
    render(&mut workspace)?;
    run(&mut workspace)?;

    if !cli.no_session {
        save_session(&SessionData::from_workspace(&workspace)).context("failed to save session")?;
    }
    workspace.on_window_close();
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(workspace: &mut Workspace) -> Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("error: {message}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        if let Err(message) = execute(workspace, command) {
            println!("error: {message}");
        }
        settle(workspace);
        render(workspace)?;
    }
    Ok(())
}

/// Pumps until no completion arrives within the settle timeout.
fn settle(workspace: &mut Workspace) {
    workspace.pump();
    while workspace.pump_timeout(SETTLE_TIMEOUT) > 0 {}
}

// =============================================================================
// Commands
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Open(PathBuf),
    Diff { file: PathBuf, staged: bool },
    Term(Option<PathBuf>),
    Summary,
    Tabs,
    /// 1-based position in the tab strip.
    Activate(usize),
    Close(usize),
    Output,
    Empty,
    Edit(String),
    Revert,
    Save,
    Toggle,
    Write(String),
    Restart,
    Clear,
    End,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "open" => Command::Open(PathBuf::from(required(word, rest, "a path")?)),
        "diff" => match rest.strip_prefix("--staged") {
            Some(file) if !file.trim().is_empty() => Command::Diff {
                file: PathBuf::from(file.trim()),
                staged: true,
            },
            _ => Command::Diff {
                file: PathBuf::from(required(word, rest, "a file")?),
                staged: false,
            },
        },
        "term" => Command::Term((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "summary" => Command::Summary,
        "tabs" => Command::Tabs,
        "activate" => Command::Activate(position(word, rest)?),
        "close" => Command::Close(position(word, rest)?),
        "output" => Command::Output,
        "empty" => Command::Empty,
        "edit" => Command::Edit(rest.replace("\\n", "\n")),
        "revert" => Command::Revert,
        "save" => Command::Save,
        "toggle" => Command::Toggle,
        "write" => Command::Write(rest.to_string()),
        "restart" => Command::Restart,
        "clear" => Command::Clear,
        "end" => Command::End,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command `{other}`")),
    };
    Ok(Some(command))
}

fn required<'a>(word: &str, rest: &'a str, what: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("`{word}` needs {what}"))
    } else {
        Ok(rest)
    }
}

fn position(word: &str, rest: &str) -> Result<usize, String> {
    required(word, rest, "a tab number")?
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| format!("`{rest}` is not a tab number"))
}

fn execute(workspace: &mut Workspace, command: Command) -> Result<(), String> {
    match command {
        Command::Open(path) => workspace.open_file(&path),
        Command::Diff { file, staged } => workspace.open_diff(&file, staged),
        Command::Term(path) => workspace.open_terminal(OpenTerminalOptions { path, focus: true }),
        Command::Summary => workspace.open_project_summary(),
        Command::Tabs => {}
        Command::Activate(n) => workspace.dispatch(Msg::ActivateTab(tab_at(workspace, n)?)),
        Command::Close(n) => workspace.dispatch(Msg::CloseTab(tab_at(workspace, n)?)),
        Command::Output => workspace.dispatch(Msg::ShowOutput),
        Command::Empty => workspace.dispatch(Msg::ShowEmpty),
        Command::Edit(text) => {
            let path = active_file(workspace)?;
            workspace.dispatch(Msg::UpdateDraft { path, text });
        }
        Command::Revert => {
            let path = active_file(workspace)?;
            workspace.dispatch(Msg::RevertDraft { path });
        }
        Command::Save => {
            let path = active_file(workspace)?;
            workspace.dispatch(Msg::SaveDraft { path });
        }
        Command::Toggle => workspace.toggle_right_panel(),
        Command::Write(text) => {
            let id = active_terminal(workspace)?;
            let mut data = text.into_bytes();
            data.push(b'\n');
            workspace.dispatch(Msg::WriteTerminal { id, data });
        }
        Command::Restart => {
            let id = active_terminal(workspace)?;
            workspace.dispatch(Msg::RestartTerminal { id });
        }
        Command::Clear => {
            let id = active_terminal(workspace)?;
            workspace.dispatch(Msg::ClearTerminal { id });
        }
        Command::End => {
            let id = active_terminal(workspace)?;
            workspace.dispatch(Msg::EndTerminal { id });
        }
        Command::Quit => {}
    }
    Ok(())
}

fn tab_at(workspace: &Workspace, position: usize) -> Result<TabKey, String> {
    workspace
        .state()
        .tabs()
        .get(position - 1)
        .map(|open| open.key.clone())
        .ok_or_else(|| format!("no tab {position}"))
}

fn active_file(workspace: &Workspace) -> Result<PathBuf, String> {
    match workspace.state().active() {
        View::File { path } => Ok(path.clone()),
        _ => Err("active view is not a file".to_string()),
    }
}

fn active_terminal(workspace: &Workspace) -> Result<TerminalId, String> {
    match workspace.state().active() {
        View::Terminal { id } => Ok(id.clone()),
        _ => Err("active view is not a terminal".to_string()),
    }
}

// =============================================================================
// Rendering
// =============================================================================

fn render(workspace: &mut Workspace) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let state = workspace.state();
    let active_key = state.active().tab_key();
    write!(out, "tabs:")?;
    if state.tabs().is_empty() {
        write!(out, " (none)")?;
    }
    for (index, open) in state.tabs().iter().enumerate() {
        let marker = if Some(&open.key) == active_key.as_ref() {
            "*"
        } else if open.unread {
            "+"
        } else {
            " "
        };
        write!(out, "  {}{}:{}", marker, index + 1, open.label)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "panel: {}",
        if state.is_right_panel_open() { "open" } else { "closed" }
    )?;

    match state.active().clone() {
        View::Empty => writeln!(out, "[empty]")?,
        View::Output => writeln!(out, "[output]")?,
        View::Panel(panel) => {
            writeln!(out, "[{}] {}", panel.title(), state.project().workspace_path.display())?;
        }
        View::File { path } => render_file(&mut out, workspace, &path)?,
        View::Diff { file, staged } => {
            writeln!(out, "[diff {}{}]", file.display(), if staged { " --staged" } else { "" })?;
            if let Some(diff) = state.diff_preview(&file, staged) {
                if diff.loading {
                    writeln!(out, "loading...")?;
                }
                if let Some(error) = &diff.error {
                    writeln!(out, "error: {error}")?;
                }
                match diff.diff.as_deref() {
                    Some("") => writeln!(out, "(no changes)")?,
                    Some(text) => write_lines(&mut out, text)?,
                    None => {}
                }
                if diff.truncated {
                    writeln!(out, "(diff truncated)")?;
                }
            }
        }
        View::Terminal { id } => {
            let (status, error) = match state.terminal(&id) {
                Some(entry) => (entry.status().label(), entry.error().map(str::to_string)),
                None => ("closed", None),
            };
            writeln!(out, "[terminal {id}] {status}")?;
            if let Some(error) = error {
                writeln!(out, "error: {error}")?;
            }
            let output = workspace.take_terminal_output(&id);
            out.write_all(&output)?;
            if !output.is_empty() && !output.ends_with(b"\n") {
                writeln!(out)?;
            }
        }
    }
    out.flush()
}

fn render_file(out: &mut impl Write, workspace: &Workspace, path: &Path) -> io::Result<()> {
    let state = workspace.state();
    writeln!(out, "[file {}]", path.display())?;
    let Some(preview) = state.file_preview(path) else {
        return Ok(());
    };
    if preview.loading {
        writeln!(out, "loading...")?;
    }
    if let Some(error) = &preview.error {
        writeln!(out, "error: {error}")?;
    }
    if preview.is_binary {
        return writeln!(out, "(binary file, cannot preview)");
    }
    if preview.content.is_some() {
        write_lines(out, &preview.draft)?;
    }
    if preview.truncated {
        writeln!(out, "(file truncated, editing disabled)")?;
    }
    if state.is_editable(path) {
        let status = match (preview.saving, preview.dirty) {
            (true, _) => "saving",
            (false, true) => "modified",
            (false, false) => "saved",
        };
        writeln!(out, "editable: {status}")?;
    }
    if let Some(error) = &preview.save_error {
        writeln!(out, "save error: {error}")?;
    }
    Ok(())
}

fn write_lines(out: &mut impl Write, text: &str) -> io::Result<()> {
    let total = text.lines().count();
    for line in text.lines().take(PREVIEW_LINES) {
        writeln!(out, "  {line}")?;
    }
    if total > PREVIEW_LINES {
        writeln!(out, "  ... {} more lines", total - PREVIEW_LINES)?;
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
