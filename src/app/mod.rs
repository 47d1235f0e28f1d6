use crate::domain::{ChatSession, ClaudePaths};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rows consumed by header, stats, column titles, rule, scroll indicator,
/// status and help lines.
const CHROME_ROWS: isize = 8;

/// Page height used when the terminal is too small to fit any chrome.
const MIN_PAGE_ROWS: usize = 10;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    Browsing,
    ConfirmingDelete,
    /// Transient: a delete batch is in flight, input is not accepted.
    Deleting,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
    /// Generation tag: a timed clear is honored only while this still
    /// matches, so a stale clear can never erase a newer message.
    pub id: u64,
}

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Delete worker finished; carries the post-delete rescan so the
    /// reducer never touches the filesystem itself.
    DeleteFinished {
        result: Result<usize, String>,
        sessions: Vec<ChatSession>,
    },
    CopyFinished {
        uuid: String,
        result: Result<(), String>,
    },
    StatusClearDue {
        id: u64,
    },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AppCommand {
    None,
    Quit,
    Rescan,
    StartDelete { uuids: Vec<String> },
    CopyUuid { uuid: String },
    ScheduleStatusClear { id: u64 },
}

#[derive(Clone, Debug)]
pub struct AppModel {
    pub paths: ClaudePaths,
    pub sessions: Vec<ChatSession>,
    pub mode: Mode,
    pub cursor: usize,
    /// Selection keyed by session UUID, not list position, so it cannot
    /// silently drift when the list changes shape.
    pub selected: BTreeSet<String>,
    pub scroll_offset: usize,
    pub terminal_size: (u16, u16),
    pub status: Option<StatusLine>,
    status_seq: u64,
}

impl AppModel {
    pub fn new(paths: ClaudePaths, sessions: Vec<ChatSession>) -> Self {
        Self {
            paths,
            sessions,
            mode: Mode::Browsing,
            cursor: 0,
            selected: BTreeSet::new(),
            scroll_offset: 0,
            terminal_size: (0, 0),
            status: None,
            status_seq: 0,
        }
    }

    pub fn with_terminal_size(mut self, width: u16, height: u16) -> Self {
        self.terminal_size = (width, height);
        self
    }

    /// Visible list rows for the current terminal height.
    pub fn page_rows(&self) -> usize {
        let rows = self.terminal_size.1 as isize - CHROME_ROWS;
        if rows < 1 { MIN_PAGE_ROWS } else { rows as usize }
    }

    /// Replace the session list and drop all positional state.
    pub fn apply_rescan(&mut self, sessions: Vec<ChatSession>) {
        self.sessions = sessions;
        self.cursor = 0;
        self.scroll_offset = 0;
        self.selected.clear();
    }

    pub fn cursor_session(&self) -> Option<&ChatSession> {
        self.sessions.get(self.cursor)
    }

    /// Selected UUIDs in list order.
    pub fn selected_uuids(&self) -> Vec<String> {
        self.sessions
            .iter()
            .filter(|session| self.selected.contains(&session.uuid))
            .map(|session| session.uuid.clone())
            .collect()
    }

    fn set_status(&mut self, kind: StatusKind, text: String) -> u64 {
        self.status_seq += 1;
        let id = self.status_seq;
        self.status = Some(StatusLine { kind, text, id });
        id
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn adjust_scroll(&mut self) {
        let rows = self.page_rows();
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + rows {
            self.scroll_offset = self.cursor + 1 - rows;
        }
    }

    fn move_cursor_by(&mut self, delta: isize) {
        if self.sessions.is_empty() {
            self.cursor = 0;
            self.scroll_offset = 0;
            return;
        }
        let last = self.sessions.len() - 1;
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, last as isize) as usize;
        self.adjust_scroll();
    }
}

pub fn update(mut model: AppModel, event: AppEvent) -> (AppModel, AppCommand) {
    match event {
        AppEvent::Resize(width, height) => {
            model.terminal_size = (width, height);
            model.adjust_scroll();
            (model, AppCommand::None)
        }

        AppEvent::Key(key) => match model.mode {
            Mode::Browsing => update_browsing(model, key),
            Mode::ConfirmingDelete => update_confirming(model, key),
            Mode::Deleting => (model, AppCommand::None),
        },

        AppEvent::DeleteFinished { result, sessions } => {
            model.mode = Mode::Browsing;
            model.apply_rescan(sessions);
            let id = match result {
                Ok(count) => {
                    model.set_status(StatusKind::Success, format!("Deleted {count} chat(s)"))
                }
                Err(error) => model.set_status(StatusKind::Error, error),
            };
            (model, AppCommand::ScheduleStatusClear { id })
        }

        AppEvent::CopyFinished { uuid, result } => {
            let id = match result {
                Ok(()) => model.set_status(
                    StatusKind::Success,
                    format!("Chat UUID copied: {uuid}"),
                ),
                Err(error) => {
                    model.set_status(StatusKind::Error, format!("Failed to copy: {error}"))
                }
            };
            (model, AppCommand::ScheduleStatusClear { id })
        }

        AppEvent::StatusClearDue { id } => {
            if model.status.as_ref().is_some_and(|status| status.id == id) {
                model.clear_status();
            }
            (model, AppCommand::None)
        }
    }
}

fn update_browsing(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let page = model.page_rows() as isize;
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => return (model, AppCommand::Quit),
        KeyCode::Char('q') => return (model, AppCommand::Quit),

        KeyCode::Up | KeyCode::Char('k') => model.move_cursor_by(-1),
        KeyCode::Down | KeyCode::Char('j') => model.move_cursor_by(1),
        KeyCode::PageDown => model.move_cursor_by(page),
        KeyCode::Char('f') if ctrl => model.move_cursor_by(page),
        KeyCode::PageUp => model.move_cursor_by(-page),
        KeyCode::Char('b') if ctrl => model.move_cursor_by(-page),
        KeyCode::Char('d') if ctrl => model.move_cursor_by(page / 2),
        KeyCode::Char('u') if ctrl => model.move_cursor_by(-(page / 2)),
        KeyCode::Home | KeyCode::Char('g') => {
            model.cursor = 0;
            model.adjust_scroll();
        }
        KeyCode::End | KeyCode::Char('G') => {
            if !model.sessions.is_empty() {
                model.cursor = model.sessions.len() - 1;
            }
            model.adjust_scroll();
        }

        KeyCode::Char(' ') => {
            if let Some(uuid) = model.cursor_session().map(|s| s.uuid.clone()) {
                if !model.selected.remove(&uuid) {
                    model.selected.insert(uuid);
                }
            }
        }

        KeyCode::Char('a') => {
            if model.sessions.is_empty() {
                return (model, AppCommand::None);
            }
            if model.selected.len() == model.sessions.len() {
                model.selected.clear();
            } else {
                model.selected = model
                    .sessions
                    .iter()
                    .map(|session| session.uuid.clone())
                    .collect();
            }
        }

        KeyCode::Char('d') => {
            if !model.selected.is_empty() {
                model.mode = Mode::ConfirmingDelete;
            }
        }

        KeyCode::Char('r') => return (model, AppCommand::Rescan),

        KeyCode::Char('c') => {
            if let Some(uuid) = model.cursor_session().map(|s| s.uuid.clone()) {
                return (model, AppCommand::CopyUuid { uuid });
            }
        }

        _ => {}
    }

    (model, AppCommand::None)
}

fn update_confirming(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    match key.code {
        KeyCode::Enter => {
            let uuids = model.selected_uuids();
            model.mode = Mode::Deleting;
            (model, AppCommand::StartDelete { uuids })
        }
        KeyCode::Esc | KeyCode::Char('n') => {
            model.mode = Mode::Browsing;
            (model, AppCommand::None)
        }
        _ => (model, AppCommand::None),
    }
}
