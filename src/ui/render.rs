//! Main frame rendering and layout.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState};

use super::styles;
use super::views;

pub fn render(frame: &mut Frame, app: &App) {
    match app.state {
        AppState::Login | AppState::AwaitingAuth => {
            views::login::render(frame, app);
            return;
        }
        _ => {}
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),    // Mail shell
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    views::mail::render(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }
    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left = if let Some(ref msg) = app.status_message {
        msg.clone()
    } else if let Some(ref err) = app.list_error {
        format!("Error: {}", err)
    } else {
        "Ready".to_string()
    };

    let right = format!(
        "{} · {} messages · {} unread ",
        app.folder.title(),
        app.visible_mail().len(),
        app.unread_count(),
    );

    let padding = (area.width as usize).saturating_sub(left.len() + right.len() + 1);
    let line = Line::from(vec![
        Span::raw(" "),
        Span::raw(left),
        Span::raw(" ".repeat(padding)),
        Span::raw(right),
    ]);

    frame.render_widget(Paragraph::new(line).style(styles::status_bar_style()), area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(50, 60, frame.area());

    let keys = [
        ("j/k, arrows", "move selection"),
        ("Enter", "open message"),
        ("Esc", "back / clear filter"),
        ("1-6, [/]", "switch folder"),
        ("Tab", "collapse sidebar"),
        ("/", "filter messages"),
        ("r", "refresh / retry"),
        ("?", "toggle this help"),
        ("q", "quit"),
    ];

    let mut lines = vec![Line::from("")];
    for (key, desc) in keys {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", key), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .border_style(styles::border_style(true));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect(30, 20, frame.area());

    let lines = vec![
        Line::from(""),
        Line::from("Quit mayl?"),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", styles::help_key_style()),
            Span::raw(" yes   "),
            Span::styled("[n]", styles::help_key_style()),
            Span::raw(" no"),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(ratatui::layout::Alignment::Center),
        area,
    );
}

/// Center a rect of the given percentage size inside `r`
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
