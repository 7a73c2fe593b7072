//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Returns true when the app should exit.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, Focus, Folder, PAGE_SCROLL_SIZE};

pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::Login => handle_login(app, key),
        AppState::AwaitingAuth => handle_awaiting_auth(app, key),
        AppState::Searching => handle_search(app, key),
        AppState::ShowingHelp => handle_help(app, key),
        AppState::ConfirmingQuit => handle_quit_confirm(app, key),
        AppState::Normal => handle_normal(app, key),
        AppState::Quitting => Ok(true),
    }
}

fn handle_login(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter => {
            app.start_login();
            Ok(false)
        }
        KeyCode::Char('q') | KeyCode::Esc => Ok(true),
        _ => Ok(false),
    }
}

fn handle_awaiting_auth(_app: &mut App, key: KeyEvent) -> Result<bool> {
    // The browser handoff has no cancel; the listener times out on its
    // own. Only quitting is honored here.
    match key.code {
        KeyCode::Char('q') => Ok(true),
        _ => Ok(false),
    }
}

fn handle_search(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.clear_search();
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Char(c) => app.push_search_char(c),
        _ => {}
    }
    Ok(false)
}

fn handle_help(app: &mut App, key: KeyEvent) -> Result<bool> {
    if matches!(key.code, KeyCode::Char('q')) {
        return Ok(true);
    }
    app.state = AppState::Normal;
    Ok(false)
}

fn handle_quit_confirm(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            app.state = AppState::Quitting;
            Ok(true)
        }
        _ => {
            app.state = AppState::Normal;
            Ok(false)
        }
    }
}

fn handle_normal(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
            app.focus = Focus::List;
        }
        KeyCode::Char('r') => app.refresh_messages(),
        KeyCode::Tab => app.sidebar_collapsed = !app.sidebar_collapsed,

        // Selection / scrolling
        KeyCode::Down | KeyCode::Char('j') => match app.focus {
            Focus::List => app.move_selection(1),
            Focus::Detail => app.detail_scroll = app.detail_scroll.saturating_add(1),
        },
        KeyCode::Up | KeyCode::Char('k') => match app.focus {
            Focus::List => app.move_selection(-1),
            Focus::Detail => app.detail_scroll = app.detail_scroll.saturating_sub(1),
        },
        KeyCode::PageDown => match app.focus {
            Focus::List => app.move_selection(PAGE_SCROLL_SIZE as isize),
            Focus::Detail => {
                app.detail_scroll = app.detail_scroll.saturating_add(PAGE_SCROLL_SIZE as u16)
            }
        },
        KeyCode::PageUp => match app.focus {
            Focus::List => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
            Focus::Detail => {
                app.detail_scroll = app.detail_scroll.saturating_sub(PAGE_SCROLL_SIZE as u16)
            }
        },

        // Folders
        KeyCode::Char(']') | KeyCode::Right => {
            if app.focus == Focus::List {
                app.next_folder();
            }
        }
        KeyCode::Char('[') | KeyCode::Left => {
            if app.focus == Focus::List {
                app.prev_folder();
            }
        }
        KeyCode::Char(c @ '1'..='6') => {
            let index = c as usize - '1' as usize;
            app.select_folder(Folder::ALL[index]);
        }

        // Open / close the message pane
        KeyCode::Enter => {
            if app.focus == Focus::List {
                app.open_selected_message();
            }
        }
        KeyCode::Esc => {
            if app.focus == Focus::Detail {
                app.close_detail();
            } else if !app.search_query.is_empty() {
                app.clear_search();
            }
        }

        _ => {}
    }
    Ok(false)
}
