/*
[INPUT]:  Crossterm key and mouse events
[OUTPUT]: AppState mutations for scrolling, search, filters, and loads
[POS]:    TUI event routing
[UPDATE]: When changing keybindings
*/

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use super::app::{AppState, InputMode};

const MOUSE_SCROLL_ROWS: isize = 3;

/// Handles key events for the TUI.
///
/// Returns `true` if quit is requested, `false` otherwise.
pub(super) fn handle_key_event(app: &mut AppState, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.input_mode == InputMode::Search {
        handle_search_key(app, key.code);
        return false;
    }

    // Any key acknowledges the reset banner.
    app.viewport.dismiss_banner();

    match key.code {
        KeyCode::Char('q') => true,
        KeyCode::Up | KeyCode::Char('k') => {
            app.scroll(-1);
            false
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.scroll(1);
            false
        }
        KeyCode::PageUp => {
            app.page_up();
            false
        }
        KeyCode::PageDown => {
            app.page_down();
            false
        }
        KeyCode::Home | KeyCode::Char('g') => {
            app.jump_to_top();
            false
        }
        KeyCode::End | KeyCode::Char('G') => {
            app.jump_to_bottom();
            false
        }
        KeyCode::Char('/') => {
            app.begin_search();
            false
        }
        KeyCode::Char('e') => {
            app.toggle_errors_only();
            false
        }
        KeyCode::Char('r') => {
            app.refresh();
            false
        }
        KeyCode::Char('R') => {
            app.retry();
            false
        }
        _ => false,
    }
}

fn handle_search_key(app: &mut AppState, key: KeyCode) {
    match key {
        KeyCode::Enter => app.finish_search(true),
        KeyCode::Esc => app.finish_search(false),
        KeyCode::Backspace => {
            app.search_draft.pop();
            app.update_search();
        }
        KeyCode::Char(c) => {
            app.search_draft.push(c);
            app.update_search();
        }
        _ => {}
    }
}

pub(super) fn handle_mouse_event(app: &mut AppState, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll(-MOUSE_SCROLL_ROWS),
        MouseEventKind::ScrollDown => app.scroll(MOUSE_SCROLL_ROWS),
        _ => {}
    }
}
