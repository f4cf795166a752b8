use crate::app::{App, AppState};
use crate::session::PendingPrompt;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

const PAGE: u16 = 5;

/// Applies one key press. Returns a prompt when the key should start a request.
pub fn handle_key(key: KeyEvent, app: &mut App) -> Option<PendingPrompt> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match app.state {
        AppState::Chat => handle_chat_input(key, app),
        AppState::JudgeModal => {
            handle_modal_input(key, app);
            None
        }
        AppState::Quit => None,
    }
}

pub fn handle_chat_input(key: KeyEvent, app: &mut App) -> Option<PendingPrompt> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Quit;
        }
        KeyCode::Char(c) if ctrl => match c {
            'c' => app.state = AppState::Quit,
            'r' => return app.session.retry(),
            'e' => {
                app.open_judge_modal();
            }
            'u' => app.scroll_up(PAGE),
            'd' => app.scroll_down(PAGE),
            _ => {}
        },
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            if !app.session.is_waiting() {
                app.session.prompt_mut().push('\n');
            }
        }
        KeyCode::Enter => return app.session.submit(),
        KeyCode::PageUp => app.scroll_up(PAGE),
        KeyCode::PageDown => app.scroll_down(PAGE),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::Backspace => {
            if !app.session.is_waiting() {
                app.session.prompt_mut().pop();
            }
        }
        KeyCode::Char(c) => {
            if !app.session.is_waiting() {
                app.session.prompt_mut().push(c);
            }
        }
        _ => {}
    }
    None
}

pub fn handle_modal_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.close_modal(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.state = AppState::Quit;
        }
        KeyCode::Up => app.modal_scroll = app.modal_scroll.saturating_sub(1),
        KeyCode::Down => app.modal_scroll = app.modal_scroll.saturating_add(1),
        KeyCode::PageUp => app.modal_scroll = app.modal_scroll.saturating_sub(PAGE),
        KeyCode::PageDown => app.modal_scroll = app.modal_scroll.saturating_add(PAGE),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ChatError;
    use crate::models::{JudgeResponse, PromptResponse};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert!(handle_key(key(KeyCode::Char(c)), app).is_none());
        }
    }

    #[test]
    fn test_typing_and_enter_submits() {
        let mut app = App::new("http://localhost:8000");
        type_text(&mut app, "hi there");
        handle_key(key(KeyCode::Backspace), &mut app);
        assert_eq!(app.session.prompt(), "hi ther");

        let pending = handle_key(key(KeyCode::Enter), &mut app).unwrap();
        assert_eq!(pending.payload(), "hi ther");
        assert_eq!(app.session.prompt(), "");
        assert!(app.session.is_waiting());
    }

    #[test]
    fn test_input_is_disabled_while_waiting() {
        let mut app = App::new("http://localhost:8000");
        type_text(&mut app, "one");
        handle_key(key(KeyCode::Enter), &mut app).unwrap();

        type_text(&mut app, "two");
        assert_eq!(app.session.prompt(), "");
        assert!(handle_key(key(KeyCode::Enter), &mut app).is_none());
        assert_eq!(app.session.messages().len(), 1);
    }

    #[test]
    fn test_shift_enter_inserts_newline() {
        let mut app = App::new("http://localhost:8000");
        type_text(&mut app, "a");
        let shift_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT);
        assert!(handle_key(shift_enter, &mut app).is_none());
        type_text(&mut app, "b");
        assert_eq!(app.session.prompt(), "a\nb");
    }

    #[test]
    fn test_ctrl_r_retries_failed_prompt() {
        let mut app = App::new("http://localhost:8000");
        type_text(&mut app, "hello");
        handle_key(key(KeyCode::Enter), &mut app).unwrap();
        app.session.fail(ChatError::request_failed("refused"));

        let pending = handle_key(ctrl('r'), &mut app).unwrap();
        assert_eq!(pending.payload(), "hello");
        assert_eq!(app.session.messages().len(), 1);
    }

    #[test]
    fn test_modal_opens_and_closes() {
        let mut app = App::new("http://localhost:8000");
        type_text(&mut app, "q");
        handle_key(key(KeyCode::Enter), &mut app).unwrap();
        app.session.complete(PromptResponse {
            message: "a".to_string(),
            judge_data: Some(JudgeResponse {
                verdict: "REVISE".to_string(),
                score: 5.0,
                overall_feedback: "Thin".to_string(),
                recommended_changes: "Expand".to_string(),
            }),
        });

        handle_key(ctrl('e'), &mut app);
        assert_eq!(app.state, AppState::JudgeModal);

        handle_key(key(KeyCode::Char('x')), &mut app);
        assert_eq!(app.session.prompt(), "");

        handle_key(key(KeyCode::Esc), &mut app);
        assert_eq!(app.state, AppState::Chat);
    }

    #[test]
    fn test_escape_quits() {
        let mut app = App::new("http://localhost:8000");
        handle_key(key(KeyCode::Esc), &mut app);
        assert!(app.should_quit());
    }
}
