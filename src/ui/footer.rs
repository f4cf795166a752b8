use crate::app::{App, AppState};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

/// Draws the footer with instructions for the current state.
pub fn draw_footer(f: &mut Frame<'_>, area: Rect, app: &App) {
    let instructions = match app.state {
        AppState::Chat if app.session.is_waiting() => {
            "Waiting for the backend. PgUp/PgDn to scroll, Esc to quit."
        }
        AppState::Chat if app.session.last_judged().is_some() => {
            "Enter to send, Shift+Enter for newline, Ctrl+E for review, Esc to quit."
        }
        AppState::Chat => "Enter to send, Shift+Enter for newline, Esc to quit.",
        AppState::JudgeModal => "Up/Down to scroll, Esc or Enter to close.",
        AppState::Quit => "",
    };

    let footer = Paragraph::new(instructions)
        .style(Style::default().fg(Color::LightCyan))
        .alignment(Alignment::Center);

    f.render_widget(footer, area);
}
