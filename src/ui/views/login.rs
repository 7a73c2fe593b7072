//! The sign-in screen.
//!
//! A full-screen view with the wordmark, a sign-in prompt and whatever
//! the last sign-in attempt had to say. While the browser handoff is in
//! flight the prompt switches to a waiting notice.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, AppState};

use super::super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Length(8),
            Constraint::Min(0),
        ])
        .split(area);

    render_banner(frame, app, chunks[1]);
}

fn render_banner(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled("mayl", styles::title_style())).alignment(Alignment::Center),
        Line::from(Span::styled(
            "Manage your emails with AI-powered assistance",
            styles::muted_style(),
        ))
        .alignment(Alignment::Center),
        Line::from(""),
    ];

    match app.state {
        AppState::AwaitingAuth => {
            lines.push(
                Line::from(Span::styled(
                    "Waiting for the browser sign-in...",
                    styles::highlight_style(),
                ))
                .alignment(Alignment::Center),
            );
            lines.push(
                Line::from(Span::styled(
                    "Finish the Google consent screen, then come back here",
                    styles::muted_style(),
                ))
                .alignment(Alignment::Center),
            );
        }
        _ => {
            lines.push(
                Line::from(vec![
                    Span::styled("[Enter]", styles::help_key_style()),
                    Span::raw(" Sign in with Google    "),
                    Span::styled("[q]", styles::help_key_style()),
                    Span::raw(" Quit"),
                ])
                .alignment(Alignment::Center),
            );
        }
    }

    if let Some(ref msg) = app.status_message {
        lines.push(Line::from(""));
        lines.push(
            Line::from(Span::styled(msg.as_str(), styles::muted_style()))
                .alignment(Alignment::Center),
        );
    }

    if let Some(ref err) = app.login_error {
        lines.push(Line::from(""));
        lines.push(
            Line::from(Span::styled(err.as_str(), styles::error_style()))
                .alignment(Alignment::Center),
        );
    }

    frame.render_widget(Paragraph::new(lines), area);
}
