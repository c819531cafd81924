mod app;
mod help_text;
pub mod requests;
pub mod terminal_compat;
pub mod theme;
mod ui;

pub use app::App;
pub use requests::RequestWorker;
pub use terminal_compat::{ColorMode, TerminalCapabilities};

use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use std::time::Duration;

/// Run the TUI application.
///
/// Draws a frame, applies any finished network replies, then waits up to
/// 100ms for a key so the progress indicator and status timeouts keep
/// updating while a request is in flight.
pub fn run(terminal: &mut DefaultTerminal, app: App) -> Result<()> {
    let mut app = app;
    app.request_greeting();

    loop {
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        app.check_for_replies();

        if !event::poll(Duration::from_millis(100))? {
            app.on_tick();
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                handle_key(&mut app, key);
            }
            Event::Paste(text) => {
                // Pasted text may carry CRLF line endings
                for c in text.replace("\r\n", "\n").chars() {
                    app.insert_char(c);
                }
            }
            _ => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    if ctrl && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // Handle help mode scrolling
    if app.show_help {
        match key.code {
            KeyCode::F(1) | KeyCode::Esc => app.toggle_help(),
            KeyCode::Down => app.scroll_help_down(),
            KeyCode::Up => app.scroll_help_up(),
            _ => {}
        }
        return;
    }

    if app.show_settings {
        if matches!(key.code, KeyCode::F(2) | KeyCode::Esc) {
            app.toggle_settings();
        }
        return;
    }

    match key.code {
        KeyCode::F(1) => app.toggle_help(),
        KeyCode::F(2) => {
            app.reload_credentials();
            app.toggle_settings();
        }
        KeyCode::Esc => {
            app.dismiss();
        }
        KeyCode::Enter if alt || key.modifiers.contains(KeyModifiers::SHIFT) => {
            app.insert_newline()
        }
        KeyCode::Enter => app.send_input(),
        KeyCode::Tab => app.next_code_section(),
        KeyCode::BackTab => app.previous_code_section(),
        KeyCode::PageUp => app.scroll_page_up(),
        KeyCode::PageDown => app.scroll_page_down(),
        KeyCode::Home if ctrl => app.scroll_to_top(),
        KeyCode::End if ctrl => app.scroll_to_bottom(),
        KeyCode::Char('n') if ctrl => app.new_chat(),
        KeyCode::Char('l') if ctrl => app.clear_input(),
        KeyCode::Char('y') if ctrl => app.copy_selected_code(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(c) if !ctrl => app.insert_char(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialStore;
    use crate::config::Config;

    fn app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("auth.json"));
        (App::new(Config::default(), None, store, None, ColorMode::Rgb), dir)
    }

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        handle_key(app, KeyEvent::new(code, modifiers));
    }

    #[test]
    fn test_typing_and_editing() {
        let (mut app, _dir) = app();
        for c in "show ip".chars() {
            press(&mut app, KeyCode::Char(c), KeyModifiers::NONE);
        }
        press(&mut app, KeyCode::Enter, KeyModifiers::ALT);
        press(&mut app, KeyCode::Char('X'), KeyModifiers::SHIFT);
        assert_eq!(app.input, "show ip\nX");

        press(&mut app, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(app.input, "show ip\n");

        press(&mut app, KeyCode::Char('l'), KeyModifiers::CONTROL);
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_popups_capture_keys() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::F(1), KeyModifiers::NONE);
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('a'), KeyModifiers::NONE);
        assert!(app.input.is_empty());
        press(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(!app.show_help);

        press(&mut app, KeyCode::F(2), KeyModifiers::NONE);
        assert!(app.show_settings);
        press(&mut app, KeyCode::F(2), KeyModifiers::NONE);
        assert!(!app.show_settings);
    }

    #[test]
    fn test_ctrl_c_quits_from_anywhere() {
        let (mut app, _dir) = app();
        app.toggle_help();
        press(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[test]
    fn test_enter_on_blank_input_does_nothing() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(app.session.error().is_none());
        assert!(app.session.history().is_empty());
    }
}
