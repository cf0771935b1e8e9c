mod render;
mod session;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::TableState;

use crate::collection::ExportSession;

use self::render::draw_selector;
use self::session::TuiSession;

const PAGE_ROWS: isize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyOutcome {
    Continue,
    Commit,
    Cancel,
}

pub(crate) struct SelectorState {
    pub(crate) input: String,
    pub(crate) table_state: TableState,
    pub(crate) status: String,
}

impl SelectorState {
    pub(crate) fn new(rows: usize) -> Self {
        let mut table_state = TableState::default();
        table_state.select((rows > 0).then_some(0));
        Self {
            input: String::new(),
            table_state,
            status: status_info("Type numbers or ranges and press Enter. Space toggles the highlighted group."),
        }
    }

    fn move_by(&mut self, delta: isize, rows: usize) {
        if rows == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(rows - 1);
        self.table_state.select(Some(next));
    }

    fn highlighted_number(&self) -> Option<usize> {
        self.table_state.selected().map(|idx| idx + 1)
    }
}

/// Full-screen group picker. Returns `true` when the operator commits the export.
pub(crate) fn select_groups(session: &mut ExportSession) -> Result<bool> {
    let tui = TuiSession::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to initialize terminal backend")?;
    terminal.clear()?;

    let mut state = SelectorState::new(session.candidates().len());
    let committed = loop {
        terminal.draw(|frame| draw_selector(frame, session, &mut state))?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match handle_key(session, &mut state, key) {
            KeyOutcome::Continue => {}
            KeyOutcome::Commit => break true,
            KeyOutcome::Cancel => break false,
        }
    };

    terminal.show_cursor()?;
    tui.leave()?;
    Ok(committed)
}

pub(crate) fn handle_key(
    session: &mut ExportSession,
    state: &mut SelectorState,
    key: KeyEvent,
) -> KeyOutcome {
    let rows = session.candidates().len();
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return KeyOutcome::Cancel,
        KeyCode::F(2) => return try_commit(session, state),
        KeyCode::Char('e') if ctrl => return try_commit(session, state),
        KeyCode::Tab => {
            session.set_exclude(!session.exclude());
            state.status = if session.exclude() {
                status_info("Exclude mode: everything except the selected groups is exported.")
            } else {
                status_info("Include mode: only the selected groups are exported.")
            };
        }
        KeyCode::Enter => {
            let expression = if state.input.trim().is_empty() {
                state.highlighted_number().map(|n| n.to_string())
            } else {
                Some(state.input.clone())
            };
            if let Some(expression) = expression {
                apply_expression(session, state, &expression);
            }
        }
        KeyCode::Char(' ') if state.input.is_empty() => {
            if let Some(number) = state.highlighted_number() {
                apply_expression(session, state, &number.to_string());
            }
        }
        KeyCode::Backspace => {
            state.input.pop();
        }
        KeyCode::Up => state.move_by(-1, rows),
        KeyCode::Down => state.move_by(1, rows),
        KeyCode::PageUp => state.move_by(-PAGE_ROWS, rows),
        KeyCode::PageDown => state.move_by(PAGE_ROWS, rows),
        KeyCode::Home => state.move_by(isize::MIN, rows),
        KeyCode::End => state.move_by(isize::MAX, rows),
        KeyCode::Char(ch) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            state.input.push(ch);
        }
        _ => {}
    }
    KeyOutcome::Continue
}

fn apply_expression(session: &mut ExportSession, state: &mut SelectorState, expression: &str) {
    match session.apply(expression) {
        Ok(()) => {
            state.input.clear();
            state.status = status_info(&format!(
                "{} group(s) selected, {} entries to export.",
                session.selection().len(),
                session.export_count()
            ));
        }
        Err(err) => state.status = status_error(&err.to_string()),
    }
}

fn try_commit(session: &ExportSession, state: &mut SelectorState) -> KeyOutcome {
    if session.selection().is_empty() && !session.exclude() {
        state.status = status_error("No groups selected.");
        return KeyOutcome::Continue;
    }
    KeyOutcome::Commit
}

pub(crate) fn status_info(msg: &str) -> String {
    format!("INFO: {msg}")
}

pub(crate) fn status_error(msg: &str) -> String {
    format!("ERROR: {msg}")
}
