use crate::{
    app::{App, AppState},
    chat_message::ChatMessage,
    constants::INPUT_PLACEHOLDER,
};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

const MAX_INPUT_LINES: usize = 4;

fn prompt_lines(prompt: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    prompt
        .split('\n')
        .flat_map(|raw| {
            if raw.width() <= width {
                vec![raw.to_string()]
            } else {
                textwrap::wrap(raw, width)
                    .into_iter()
                    .map(|line| line.into_owned())
                    .collect()
            }
        })
        .collect()
}

/// Height of the input box including its border.
pub fn input_height(app: &App, width: u16) -> u16 {
    let inner = width.saturating_sub(2) as usize;
    let lines = prompt_lines(app.session.prompt(), inner).len();
    lines.clamp(1, MAX_INPUT_LINES) as u16 + 2
}

pub fn draw_messages(f: &mut Frame<'_>, area: Rect, app: &mut App) {
    if app.session.messages().is_empty() {
        let placeholder = Paragraph::new(Line::from(Span::styled(
            "No messages yet",
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Center);
        f.render_widget(placeholder, area);
        return;
    }

    let mut lines: Vec<Line<'static>> = Vec::new();
    for message in app.session.messages() {
        lines.extend(ChatMessage::new(message).render(area.width));
        lines.push(Line::default());
    }

    let scroll = app.sync_scroll(lines.len(), area.height);
    f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), area);
}

pub fn draw_input(f: &mut Frame<'_>, area: Rect, app: &App) {
    let waiting = app.session.is_waiting();
    let (title, border_style) = if waiting {
        ("Prompt (waiting)", Style::default().fg(Color::DarkGray))
    } else {
        ("Prompt", Style::default().fg(Color::LightYellow))
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style);

    let inner_width = area.width.saturating_sub(2) as usize;
    let visible = area.height.saturating_sub(2) as usize;
    let prompt = app.session.prompt();

    if prompt.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            INPUT_PLACEHOLDER,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))
        .block(block);
        f.render_widget(placeholder, area);
        if !waiting && app.state == AppState::Chat {
            f.set_cursor_position((area.x + 1, area.y + 1));
        }
        return;
    }

    let wrapped = prompt_lines(prompt, inner_width);
    let skip = wrapped.len().saturating_sub(visible);
    let text_style = if waiting {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::LightYellow)
    };
    let lines: Vec<Line<'static>> = wrapped
        .iter()
        .skip(skip)
        .map(|line| Line::from(Span::styled(line.clone(), text_style)))
        .collect();
    f.render_widget(Paragraph::new(lines).block(block), area);

    if !waiting && app.state == AppState::Chat {
        let last = wrapped.last().map(|line| line.width()).unwrap_or(0);
        let row = (wrapped.len() - skip).saturating_sub(1) as u16;
        let col = (last as u16).min(inner_width as u16);
        f.set_cursor_position((area.x + 1 + col, area.y + 1 + row));
    }
}
