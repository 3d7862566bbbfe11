//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppState, Focus, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::ShowingAlert => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                app.dismiss_alert();
            }
            return Ok(false);
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Quitting => return Ok(true),
        AppState::Normal => {}
    }

    // Works from anywhere, including while typing
    if key.code == KeyCode::Char('e') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.export();
        return Ok(false);
    }

    match key.code {
        KeyCode::Tab => {
            app.focus = app.focus.next();
            return Ok(false);
        }
        KeyCode::BackTab => {
            app.focus = app.focus.prev();
            return Ok(false);
        }
        _ => {}
    }

    if app.focus.is_input() {
        handle_form_input(app, key);
    } else {
        handle_list_input(app, key);
    }
    Ok(false)
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            if app.focus == Focus::Description {
                app.focus = Focus::Amount;
            } else {
                app.submit_entry();
            }
        }
        KeyCode::Esc => {
            app.focus = Focus::List;
        }
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.status_message = None;
            app.push_char(c);
        }
        _ => {}
    }
}

fn handle_list_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('a') | KeyCode::Char('i') => {
            app.focus = Focus::Description;
        }
        KeyCode::Char('e') => app.export(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(1),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(1),
        KeyCode::PageDown => app.select_next(PAGE_SCROLL_SIZE),
        KeyCode::PageUp => app.select_prev(PAGE_SCROLL_SIZE),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tallybook_core::{Config, LedgerStore, MemoryStorage, Storage};

    fn app() -> App {
        let storage: Box<dyn Storage> = Box::new(MemoryStorage::new());
        let store =
            LedgerStore::new(storage).with_clock(|| NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        App::with_store(Config::default(), store)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_type_and_add_entry() {
        let mut app = app();
        type_text(&mut app, "Coffee, Large");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.focus, Focus::Amount);
        type_text(&mut app, "4");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.view.len(), 1);
        assert_eq!(app.view.row(0).unwrap().description, "Coffee, Large");
        assert_eq!(app.focus, Focus::Description);
    }

    #[test]
    fn test_letters_go_to_form_not_commands() {
        let mut app = app();
        type_text(&mut app, "dq");
        assert_eq!(app.description_input, "dq");
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_delete_flow_from_list() {
        let mut app = app();
        type_text(&mut app, "Tea");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "2");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.focus, Focus::List);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.state, AppState::ConfirmingDelete);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.view.len(), 1);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.view.is_empty());
    }

    #[test]
    fn test_invalid_amount_shows_alert_until_dismissed() {
        let mut app = app();
        type_text(&mut app, "Tea");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "abc");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::ShowingAlert);

        // Other keys are swallowed by the alert
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.amount_input, "abc");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::Normal);
        assert!(app.view.is_empty());
    }

    #[test]
    fn test_quit_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!press(&mut app, KeyCode::Char('n')));
        press(&mut app, KeyCode::Char('q'));
        assert!(press(&mut app, KeyCode::Char('y')));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_ctrl_e_exports_from_form() {
        let mut app = app();
        handle_input(&mut app, KeyEvent::new(KeyCode::Char('e'), KeyModifiers::CONTROL)).unwrap();
        // Empty ledger, so the export is refused with an alert
        assert_eq!(app.state, AppState::ShowingAlert);
        assert!(app.description_input.is_empty());
    }
}
