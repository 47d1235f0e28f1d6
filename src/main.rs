mod app;
mod cli;
mod domain;
mod infra;
mod ui;

use crate::app::{AppCommand, AppEvent, AppModel};
use crate::cli::CliInvocation;
use crate::domain::ClaudePaths;
use crate::infra::{
    Config, copy_text, default_claude_dir, delete_sessions, load_config, local_utc_offset,
    prompt_for_claude_dir, save_config, scan_sessions,
};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::size as terminal_size;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};
use thiserror::Error;

/// How long transient status messages stay on screen.
const STATUS_LINGER: Duration = Duration::from_secs(2);

/// Environment override for the Claude root, checked before the config file.
const CLAUDE_DIR_ENV: &str = "CCSWEEP_CLAUDE_DIR";

#[derive(Debug, Error)]
enum MainError {
    #[error(transparent)]
    App(#[from] crate::app::AppError),

    #[error("failed to read setup input: {0}")]
    Prompt(#[from] crate::infra::PromptError),

    #[error("Claude directory not found: {0}")]
    ClaudeDirNotFound(PathBuf),
}

#[derive(Debug)]
struct DeleteSignal {
    result: Result<usize, String>,
    sessions: Vec<crate::domain::ChatSession>,
}

#[derive(Debug)]
struct CopySignal {
    uuid: String,
    result: Result<(), String>,
}

fn main() {
    if let Err(error) = run_main() {
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{error}");
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), MainError> {
    let args = std::env::args().collect::<Vec<_>>();
    let invocation = match crate::cli::parse_invocation(&args) {
        Ok(invocation) => invocation,
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{error}");
            let _ = writeln!(err);
            print_help();
            std::process::exit(2);
        }
    };

    match invocation {
        CliInvocation::PrintHelp => {
            print_help();
            Ok(())
        }
        CliInvocation::PrintVersion => {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliInvocation::Tui { root_override } => {
            let root = resolve_claude_root(root_override)?;
            if !root.is_dir() {
                return Err(MainError::ClaudeDirNotFound(root));
            }
            Ok(run_tui(ClaudePaths::new(root))?)
        }
    }
}

fn print_help() {
    let text = format!(
        "{name} - manage Claude chat sessions\n\nUSAGE:\n  {name} [--root PATH]   Start the TUI\n  {name} --help | --version\n\nFLAGS:\n  --root PATH   Claude directory to manage (overrides config and env)\n\nKEYS:\n  Up/Down/PgUp/PgDn  Navigate   Home/End  Jump   Ctrl+U/D  Half page\n  SPACE  Toggle selection       A  Select all / none\n  C      Copy chat UUID         D  Delete selected (with confirmation)\n  R      Refresh                Q  Quit\n\nENV:\n  {env}   Override the Claude directory (default: ~/.claude)\n",
        name = env!("CARGO_PKG_NAME"),
        env = CLAUDE_DIR_ENV,
    );
    let mut out = io::stdout().lock();
    let _ = write!(out, "{text}");
}

/// Root resolution order: `--root` flag, then env, then the saved config.
/// First run with none of those prompts interactively and saves the answer.
fn resolve_claude_root(root_override: Option<PathBuf>) -> Result<PathBuf, MainError> {
    if let Some(root) = root_override {
        return Ok(root);
    }
    if let Some(root) = std::env::var_os(CLAUDE_DIR_ENV) {
        return Ok(PathBuf::from(root));
    }

    match load_config() {
        Ok(Some(config)) => return Ok(config.claude_dir),
        Ok(None) => {}
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "warning: ignoring config: {error}");
        }
    }

    let default_dir = default_claude_dir();
    if default_dir.is_dir() {
        return Ok(default_dir);
    }

    let root = prompt_for_claude_dir()?;
    match save_config(&Config {
        claude_dir: root.clone(),
    }) {
        Ok(path) => {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "Saved to {}", path.display());
        }
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "warning: failed to save config: {error}");
        }
    }
    Ok(root)
}

fn run_tui(paths: ClaudePaths) -> Result<(), crate::app::AppError> {
    // Resolve the local offset while still single-threaded; worker threads
    // spawned later reuse the cached value.
    local_utc_offset();

    let sessions = scan_sessions(&paths);
    let mut model = AppModel::new(paths, sessions);

    let mut terminal = setup_terminal()?;
    if let Ok((width, height)) = terminal_size() {
        model = model.with_terminal_size(width, height);
    }
    let result = run(&mut terminal, model);
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, crate::app::AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<(), crate::app::AppError> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut model: AppModel,
) -> Result<(), crate::app::AppError> {
    let (delete_tx, delete_rx) = channel::<DeleteSignal>();
    let (copy_tx, copy_rx) = channel::<CopySignal>();
    let mut status_clear_deadline: Option<(u64, Instant)> = None;

    loop {
        let mut pending = Vec::new();

        while let Ok(signal) = delete_rx.try_recv() {
            pending.push(AppEvent::DeleteFinished {
                result: signal.result,
                sessions: signal.sessions,
            });
        }
        while let Ok(signal) = copy_rx.try_recv() {
            pending.push(AppEvent::CopyFinished {
                uuid: signal.uuid,
                result: signal.result,
            });
        }
        if let Some((id, due)) = status_clear_deadline {
            if Instant::now() >= due {
                status_clear_deadline = None;
                pending.push(AppEvent::StatusClearDue { id });
            }
        }

        for event in pending {
            let (next, command) = app::update(model, event);
            model = next;
            match execute_command(&mut model, command, &delete_tx, &copy_tx) {
                CommandOutcome::Continue => {}
                CommandOutcome::Quit => return Ok(()),
                CommandOutcome::ClearStatusAt(id, due) => {
                    status_clear_deadline = Some((id, due));
                }
            }
        }

        terminal.draw(|frame| ui::render(frame, &model))?;

        if event::poll(Duration::from_millis(200))? {
            let event = match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    AppEvent::Key(key)
                }
                Event::Resize(width, height) => AppEvent::Resize(width, height),
                _ => continue,
            };

            let (next, command) = app::update(model, event);
            model = next;
            match execute_command(&mut model, command, &delete_tx, &copy_tx) {
                CommandOutcome::Continue => {}
                CommandOutcome::Quit => return Ok(()),
                CommandOutcome::ClearStatusAt(id, due) => {
                    status_clear_deadline = Some((id, due));
                }
            }
        }
    }
}

enum CommandOutcome {
    Continue,
    Quit,
    ClearStatusAt(u64, Instant),
}

fn execute_command(
    model: &mut AppModel,
    command: AppCommand,
    delete_tx: &std::sync::mpsc::Sender<DeleteSignal>,
    copy_tx: &std::sync::mpsc::Sender<CopySignal>,
) -> CommandOutcome {
    match command {
        AppCommand::None => CommandOutcome::Continue,
        AppCommand::Quit => CommandOutcome::Quit,

        AppCommand::Rescan => {
            let sessions = scan_sessions(&model.paths);
            model.apply_rescan(sessions);
            CommandOutcome::Continue
        }

        AppCommand::StartDelete { uuids } => {
            let paths = model.paths.clone();
            let tx = delete_tx.clone();
            std::thread::spawn(move || {
                let result = delete_sessions(&paths, &uuids).map_err(|error| {
                    format!("{error} ({} of {} deleted)", error.completed(), uuids.len())
                });
                let sessions = scan_sessions(&paths);
                let _ = tx.send(DeleteSignal { result, sessions });
            });
            CommandOutcome::Continue
        }

        AppCommand::CopyUuid { uuid } => {
            let tx = copy_tx.clone();
            std::thread::spawn(move || {
                let result = copy_text(&uuid).map_err(|error| error.to_string());
                let _ = tx.send(CopySignal { uuid, result });
            });
            CommandOutcome::Continue
        }

        AppCommand::ScheduleStatusClear { id } => {
            CommandOutcome::ClearStatusAt(id, Instant::now() + STATUS_LINGER)
        }
    }
}
