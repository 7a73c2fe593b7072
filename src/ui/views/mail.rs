//! The mail-reading shell: header bar, collapsible sidebar, message
//! list and the opened-message pane.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, Focus, Folder};
use crate::utils::{sender_name, truncate};

use super::super::styles;

/// Sidebar width when expanded / collapsed
const SIDEBAR_WIDTH: u16 = 22;
const SIDEBAR_COLLAPSED_WIDTH: u16 = 6;

/// Column widths in the message list
const FLAGS_WIDTH: usize = 4;
const FROM_WIDTH: usize = 22;
const TIME_WIDTH: usize = 5;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header bar
            Constraint::Min(5),    // Sidebar + content
        ])
        .split(area);

    render_header(frame, app, chunks[0]);

    let sidebar_width = if app.sidebar_collapsed {
        SIDEBAR_COLLAPSED_WIDTH
    } else {
        SIDEBAR_WIDTH
    };
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(sidebar_width), Constraint::Min(20)])
        .split(chunks[1]);

    render_sidebar(frame, app, body[0]);

    match app.focus {
        Focus::Detail => render_detail(frame, app, body[1]),
        Focus::List => render_list(frame, app, body[1]),
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  mayl";
    let menu_hint = "[Tab] menu";
    let help_hint = "[?] Help  ";

    let search = match app.state {
        AppState::Searching => format!("/{}_", app.search_query),
        _ if !app.search_query.is_empty() => format!("filter: {}  [Esc] clear", app.search_query),
        _ => "Search mail or talk to mayl  [/]".to_string(),
    };
    let search_style = if matches!(app.state, AppState::Searching) || !app.search_query.is_empty()
    {
        styles::search_style()
    } else {
        styles::muted_style()
    };

    let left_len = title.len() + 2 + menu_hint.len();
    let padding = (area.width as usize)
        .saturating_sub(left_len + search.len() + help_hint.len() + 4)
        / 2;

    let line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw("  "),
        Span::styled(menu_hint, styles::muted_style()),
        Span::raw(" ".repeat(padding.max(1))),
        Span::styled(search, search_style),
        Span::raw(" ".repeat(padding.max(1))),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = Folder::ALL
        .iter()
        .map(|folder| {
            let selected = *folder == app.folder;
            let label = if app.sidebar_collapsed {
                folder.title().chars().take(1).collect::<String>()
            } else {
                let badge = if selected {
                    match app.total_count {
                        Some(count) => format!("{}", count),
                        None => format!("{}", app.mail.len()),
                    }
                } else {
                    String::new()
                };
                let width = SIDEBAR_WIDTH as usize - 4;
                format!(
                    "{:<label_width$}{:>badge_width$}",
                    folder.title(),
                    badge,
                    label_width = width.saturating_sub(badge.len().min(width)),
                    badge_width = badge.len(),
                )
            };
            ListItem::new(Line::from(Span::styled(
                format!(" {}", label),
                styles::folder_style(selected),
            )))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(styles::muted_style());
    frame.render_widget(List::new(items).block(block), area);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::NONE)
        .title(format!(" {} ", app.folder.title()))
        .title_style(styles::muted_style());

    if app.loading {
        render_notice(frame, area, block, vec![Line::from("Loading...")]);
        return;
    }

    if let Some(ref error) = app.list_error {
        render_notice(
            frame,
            area,
            block,
            vec![
                Line::from(Span::styled(error.as_str(), styles::error_style())),
                Line::from(""),
                Line::from(vec![
                    Span::styled("[r]", styles::help_key_style()),
                    Span::raw(" Retry"),
                ]),
            ],
        );
        return;
    }

    let visible = app.visible_mail();
    if visible.is_empty() {
        let notice = if app.search_query.is_empty() {
            "No messages"
        } else {
            "No messages match the filter"
        };
        render_notice(frame, area, block, vec![Line::from(notice)]);
        return;
    }

    let width = area.width as usize;
    let items: Vec<ListItem> = visible.iter().map(|m| list_row(m, width)).collect();

    let mut state = ListState::default();
    state.select(Some(app.selection.min(visible.len() - 1)));

    let list = List::new(items)
        .block(block)
        .highlight_style(styles::selected_style());
    frame.render_stateful_widget(list, area, &mut state);
}

/// One message row: flags, sender, subject + preview, clock time
fn list_row<'a>(m: &crate::models::MailItem, width: usize) -> ListItem<'a> {
    let flags = format!(
        "{}{}{}{}",
        if m.read { ' ' } else { '●' },
        if m.starred { '★' } else { ' ' },
        if m.important { '!' } else { ' ' },
        if m.has_attachment { '@' } else { ' ' },
    );

    let from = format!(
        "{:<width$}",
        truncate(&sender_name(&m.from), FROM_WIDTH),
        width = FROM_WIDTH
    );

    let text_width = width.saturating_sub(FLAGS_WIDTH + 1 + FROM_WIDTH + 2 + TIME_WIDTH + 2);
    let subject_width = text_width.min(m.subject.chars().count());
    let subject = truncate(&m.subject, text_width);
    let preview = truncate(
        &m.preview,
        text_width.saturating_sub(subject_width + 2),
    );
    let pad = text_width
        .saturating_sub(subject.chars().count() + 2 + preview.chars().count());

    let base = if m.read {
        styles::list_item_style()
    } else {
        styles::unread_style()
    };

    let line = Line::from(vec![
        Span::styled(flags, styles::highlight_style()),
        Span::raw(" "),
        Span::styled(from, base),
        Span::raw("  "),
        Span::styled(subject, base),
        Span::raw("  "),
        Span::styled(preview, styles::muted_style()),
        Span::raw(" ".repeat(pad)),
        Span::styled(format!("{:>width$}", m.time, width = TIME_WIDTH), styles::muted_style()),
    ]);
    ListItem::new(line)
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::NONE)
        .title(" Message  [Esc] back ")
        .title_style(styles::muted_style());

    let Some(ref detail) = app.detail else {
        render_notice(frame, area, block, vec![Line::from("Loading message...")]);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(detail.subject.clone(), styles::unread_style())),
        Line::from(vec![
            Span::styled("From: ", styles::muted_style()),
            Span::raw(detail.sender.clone()),
        ]),
        Line::from(vec![
            Span::styled("To:   ", styles::muted_style()),
            Span::raw(detail.recipients.clone()),
        ]),
        Line::from(vec![
            Span::styled("Date: ", styles::muted_style()),
            Span::raw(detail.date.clone()),
        ]),
    ];
    if detail.has_attachments {
        lines.push(Line::from(Span::styled(
            "Has attachments",
            styles::highlight_style(),
        )));
    }
    lines.push(Line::from(Span::styled(
        "─".repeat(area.width.saturating_sub(2) as usize),
        styles::muted_style(),
    )));
    for body_line in detail.body.lines() {
        lines.push(Line::from(body_line.to_string()));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_notice(frame: &mut Frame, area: Rect, block: Block, lines: Vec<Line>) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Min(3),
            Constraint::Percentage(40),
        ])
        .split(area);

    frame.render_widget(block, area);
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, vertical[1]);
}
