use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table};

use crate::collection::ExportSession;

use super::SelectorState;

pub(super) fn draw_selector(frame: &mut Frame, session: &ExportSession, state: &mut SelectorState) {
    let bg = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(bg, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let muted = Style::default().fg(Color::Rgb(185, 195, 210));
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "GROUP EXPORT",
            Style::default()
                .fg(Color::Rgb(110, 170, 255))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(format!("{} groups", session.candidates().len()), muted),
        Span::styled("   ", Style::default()),
        Span::styled(format!("{} selected", session.selection().len()), muted),
        Span::styled("   ", Style::default()),
        Span::styled(
            format!("{} entries to export", session.export_count()),
            muted,
        ),
        Span::styled("   ", Style::default()),
        Span::styled(" INCLUDE ", mode_pill_style(!session.exclude())),
        Span::styled(" ", Style::default()),
        Span::styled(" EXCLUDE ", mode_pill_style(session.exclude())),
    ]))
    .alignment(Alignment::Center)
    .block(panel_block("Export"));
    frame.render_widget(header, chunks[0]);

    let rows: Vec<Row> = session
        .candidates()
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let picked = session.selection().contains(label);
            let style = if picked {
                Style::default().fg(Color::Rgb(150, 220, 160))
            } else {
                Style::default().fg(Color::Rgb(230, 230, 230))
            };
            Row::new(vec![
                Cell::from((idx + 1).to_string()),
                Cell::from(if picked { "[x]" } else { "[ ]" }),
                Cell::from(label.clone()),
                Cell::from(session.index().count(label).to_string()),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(4),
            Constraint::Min(20),
            Constraint::Length(9),
        ],
    )
    .header(
        Row::new(vec!["#", "Sel", "Group", "Entries"]).style(
            Style::default()
                .fg(Color::Rgb(110, 170, 255))
                .add_modifier(Modifier::BOLD),
        ),
    )
    .block(panel_block("Groups"))
    .row_highlight_style(
        Style::default()
            .bg(Color::Rgb(110, 170, 255))
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▸ ");
    frame.render_stateful_widget(table, chunks[1], &mut state.table_state);

    let accent = Style::default().fg(Color::Rgb(110, 170, 255));
    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", accent),
        Span::styled(
            state.input.clone(),
            Style::default().fg(Color::Rgb(230, 235, 242)),
        ),
        Span::styled("_", accent),
    ]))
    .block(panel_block("Selection (1,3-5 | all | none)"));
    frame.render_widget(input, chunks[2]);

    let controls = Paragraph::new(Line::from(Span::styled(
        "Enter apply  Space toggle  Tab include/exclude  F2/Ctrl-E export  Esc cancel  ↑/↓ PgUp/PgDn move",
        muted,
    )))
    .alignment(Alignment::Center)
    .block(panel_block("Controls"));
    frame.render_widget(controls, chunks[3]);

    let status_widget = Paragraph::new(state.status.clone())
        .style(status_style(&state.status))
        .block(panel_block("Status"));
    frame.render_widget(status_widget, chunks[4]);
}

fn panel_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(125, 135, 150)))
        .title(title)
}

fn mode_pill_style(active: bool) -> Style {
    if active {
        Style::default()
            .bg(Color::Rgb(110, 170, 255))
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .bg(Color::Rgb(72, 82, 96))
            .fg(Color::Rgb(230, 235, 242))
    }
}

fn status_style(status: &str) -> Style {
    if status.starts_with("ERROR:") {
        Style::default()
            .fg(Color::Rgb(255, 145, 120))
            .add_modifier(Modifier::BOLD)
    } else if status.starts_with("INFO:") {
        Style::default().fg(Color::Rgb(205, 165, 255))
    } else {
        Style::default().fg(Color::Rgb(230, 235, 242))
    }
}
