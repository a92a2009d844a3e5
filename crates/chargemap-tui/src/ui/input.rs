//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Network work is only ever started here;
//! results come back through `App::check_background_tasks`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppState, Tab, PAGE_SCROLL_SIZE};
use crate::forms::{
    can_add_number_char, can_add_password_char, can_add_text_char, signup_field_mut, LoginFocus,
    SignupFocus, StationField,
};

/// Ctrl+S or F2 switches between the login and signup overlays.
fn is_auth_toggle(key: &KeyEvent) -> bool {
    key.code == KeyCode::F(2)
        || (key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    match app.state {
        AppState::LoggingIn => {
            handle_login_input(app, key);
            return false;
        }
        AppState::SigningUp => {
            handle_signup_input(app, key);
            return false;
        }
        AppState::EditingStation => {
            handle_station_form_input(app, key);
            return false;
        }
        AppState::EditingPowerFilter => {
            handle_power_filter_input(app, key);
            return false;
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return false;
        }
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.pending_delete = None;
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return false;
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return true;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = if app.is_authenticated() {
                        AppState::Normal
                    } else {
                        AppState::LoggingIn
                    };
                }
                _ => {}
            }
            return false;
        }
        AppState::Quitting => return true,
        AppState::Normal => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('1') => app.current_tab = Tab::Stations,
        KeyCode::Char('2') => app.current_tab = Tab::Map,
        KeyCode::Left => app.current_tab = app.current_tab.prev(),
        KeyCode::Right | KeyCode::Tab => app.current_tab = app.current_tab.next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(1),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(1),
        KeyCode::PageUp => app.select_prev(PAGE_SCROLL_SIZE),
        KeyCode::PageDown => app.select_next(PAGE_SCROLL_SIZE),
        KeyCode::Home | KeyCode::Char('g') => app.station_selection = 0,
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('u') => app.refresh_stations(true),
        KeyCode::Char('L') => {
            if app.is_authenticated() {
                app.logout();
            }
        }
        KeyCode::Char('n') => app.open_new_station(),
        KeyCode::Char('e') => app.open_edit_station(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('s') => app.cycle_status_filter(),
        KeyCode::Char('c') => app.cycle_connector_filter(),
        KeyCode::Char('p') => app.start_power_filter(),
        KeyCode::Char('x') => app.clear_filters(),
        KeyCode::Esc => app.status_message = None,
        _ => {}
    }

    false
}

fn handle_login_input(app: &mut App, key: KeyEvent) {
    if is_auth_toggle(&key) {
        app.start_signup();
        return;
    }

    match key.code {
        KeyCode::Tab | KeyCode::Down => app.login_focus = app.login_focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.login_focus = app.login_focus.prev(),
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => app.submit_login(),
        },
        KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_text_char(app.login_email.chars().count(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
}

fn handle_signup_input(app: &mut App, key: KeyEvent) {
    if is_auth_toggle(&key) || key.code == KeyCode::Esc {
        app.start_login();
        return;
    }

    let focus = app.signup_focus;
    match key.code {
        KeyCode::Tab | KeyCode::Down => app.signup_focus = focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.signup_focus = focus.prev(),
        KeyCode::Enter => {
            if matches!(focus, SignupFocus::ConfirmPassword | SignupFocus::Button) {
                app.submit_signup();
            } else {
                app.signup_focus = focus.next();
            }
        }
        KeyCode::Backspace => {
            if let Some(buffer) = signup_field_mut(&mut app.signup, focus) {
                buffer.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(buffer) = signup_field_mut(&mut app.signup, focus) {
                let len = buffer.chars().count();
                let accepted = if focus.is_secret() {
                    can_add_password_char(len, c)
                } else {
                    can_add_text_char(len, c)
                };
                if accepted {
                    buffer.push(c);
                }
            }
        }
        _ => {}
    }
}

fn handle_station_form_input(app: &mut App, key: KeyEvent) {
    let focus = app.station_form.focus;
    match key.code {
        KeyCode::Esc => app.close_station_form(),
        KeyCode::Enter if focus == StationField::Submit => app.submit_station_form(),
        KeyCode::Tab | KeyCode::Down | KeyCode::Enter => app.station_form.focus = focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.station_form.focus = focus.prev(),
        KeyCode::Left if focus.is_choice() => app.station_form.cycle_choice(false),
        KeyCode::Right | KeyCode::Char(' ') if focus.is_choice() => {
            app.station_form.cycle_choice(true)
        }
        KeyCode::Backspace => app.station_form.pop_char(),
        KeyCode::Char(c) => app.station_form.push_char(c),
        _ => {}
    }
}

fn handle_power_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.apply_power_filter(),
        KeyCode::Esc => app.state = AppState::Normal,
        KeyCode::Backspace => {
            app.power_filter_input.pop();
        }
        KeyCode::Char(c) => {
            if can_add_number_char(&app.power_filter_input, c) {
                app.power_filter_input.push(c);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chargemap_core::Config;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        App::new(Config::default()).expect("app")
    }

    #[test]
    fn test_quit_needs_confirmation() {
        let mut app = app();
        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))));
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_login_typing_and_focus() {
        let mut app = app();
        app.login_email.clear();
        app.start_login();

        for c in "a@b.com".chars() {
            handle_input(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(app.login_email, "a@b.com");

        handle_input(&mut app, key(KeyCode::Tab));
        handle_input(&mut app, key(KeyCode::Char('q')));
        assert_eq!(app.login_password, "q");
        assert_eq!(app.state, AppState::LoggingIn);

        handle_input(&mut app, key(KeyCode::Backspace));
        assert!(app.login_password.is_empty());
    }

    #[test]
    fn test_ctrl_s_toggles_signup() {
        let mut app = app();
        app.start_login();
        handle_input(&mut app, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(app.state, AppState::SigningUp);
        handle_input(&mut app, key(KeyCode::F(2)));
        assert_eq!(app.state, AppState::LoggingIn);
    }

    #[test]
    fn test_power_filter_accepts_only_numbers() {
        let mut app = app();
        handle_input(&mut app, key(KeyCode::Char('p')));
        assert_eq!(app.state, AppState::EditingPowerFilter);
        for c in "5x0".chars() {
            handle_input(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(app.power_filter_input, "50");
        handle_input(&mut app, key(KeyCode::Enter));
        assert_eq!(app.filter.power_output, Some(50.0));
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_station_form_choice_keys() {
        let mut app = app();
        app.state = AppState::EditingStation;
        handle_input(&mut app, key(KeyCode::Tab));
        assert_eq!(app.station_form.focus, StationField::Status);
        handle_input(&mut app, key(KeyCode::Right));
        assert!(app.station_form.status.is_some());
        handle_input(&mut app, key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Normal);
        assert!(app.station_form.status.is_none());
    }
}
