use crate::constants::SPINNER_FRAMES;
use crate::session::ChatSession;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

#[derive(Debug, Default)]
pub struct StatusIndicator {
    spinner_idx: usize,
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_spinner(&mut self) {
        self.spinner_idx = self.spinner_idx.wrapping_add(1);
    }

    pub fn line(&self, session: &ChatSession) -> Line<'static> {
        if session.is_waiting() {
            let frame = SPINNER_FRAMES[self.spinner_idx % SPINNER_FRAMES.len()];
            return Line::from(vec![
                Span::styled(frame.to_string(), Style::default().fg(Color::Gray)),
                Span::raw(" "),
                Span::styled(
                    "Waiting for response...".to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
        }

        match session.last_error() {
            Some(error) => {
                let mut spans = vec![
                    Span::styled(
                        "✗ ".to_string(),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(error.to_string(), Style::default().fg(Color::Red)),
                ];
                if session.can_retry() {
                    spans.push(Span::styled(
                        " · Ctrl+R to retry".to_string(),
                        Style::default().fg(Color::Yellow),
                    ));
                }
                Line::from(spans)
            }
            None => Line::default(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, session: &ChatSession) {
        frame.render_widget(
            Paragraph::new(self.line(session)).alignment(Alignment::Left),
            area,
        );
    }
}
