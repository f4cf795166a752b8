use crate::constants::{RECIPIENT_LABEL, USER_INDENT, USER_LABEL};
use crate::markdown::render_lines;
use crate::models::{JudgeResponse, Message, ScoreBand};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Terminal rendering of one transcript entry.
#[derive(Debug, Clone, Copy)]
pub struct ChatMessage<'a> {
    message: &'a Message,
}

impl<'a> ChatMessage<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self { message }
    }

    pub fn render(&self, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let base_style = self.get_base_style();

        self.render_header(&mut lines, base_style);
        self.render_content(&mut lines, width, base_style);
        self.render_footer(&mut lines, base_style);

        lines
    }

    fn indent(&self) -> &'static str {
        if self.message.is_user() {
            USER_INDENT
        } else {
            ""
        }
    }

    fn get_base_style(&self) -> Style {
        Style::default().fg(if self.message.is_user() {
            Color::Rgb(255, 223, 128)
        } else {
            Color::Rgb(144, 238, 144)
        })
    }

    fn render_header(&self, lines: &mut Vec<Line<'static>>, style: Style) {
        let label = if self.message.is_user() {
            USER_LABEL
        } else {
            RECIPIENT_LABEL
        };
        let timestamp = self.message.sent_at().format("%H:%M").to_string();

        let mut header = vec![
            Span::styled(self.indent().to_string(), style),
            Span::styled("┌─ ".to_string(), style),
            Span::styled(label.to_string(), style.add_modifier(Modifier::BOLD)),
            Span::styled(" ".to_string(), style),
            Span::styled(timestamp, style.add_modifier(Modifier::DIM)),
        ];
        if let Some(judge) = self.message.judge_data() {
            header.push(Span::raw("  "));
            header.push(verdict_badge(judge));
        }

        lines.push(Line::from(header));
    }

    fn render_content(&self, lines: &mut Vec<Line<'static>>, width: u16, style: Style) {
        let indent = self.indent();
        let body_width = (width as usize).saturating_sub(indent.len() + 2);

        for body_line in render_lines(self.message.text(), body_width, style) {
            let mut spans = vec![
                Span::styled(indent.to_string(), style),
                Span::styled("│ ".to_string(), style),
            ];
            spans.extend(body_line.spans);
            lines.push(Line::from(spans));
        }
    }

    fn render_footer(&self, lines: &mut Vec<Line<'static>>, style: Style) {
        let mut footer = vec![
            Span::styled(self.indent().to_string(), style),
            Span::styled("╰─".to_string(), style),
        ];
        if self.message.judge_data().is_some() {
            footer.push(Span::styled(
                " Ctrl+E for review".to_string(),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(footer));
    }
}

pub fn band_color(judge: &JudgeResponse) -> Color {
    match judge.score_band() {
        ScoreBand::Low => Color::LightRed,
        ScoreBand::Mid => Color::Yellow,
        ScoreBand::High => Color::LightGreen,
    }
}

pub fn verdict_badge(judge: &JudgeResponse) -> Span<'static> {
    Span::styled(
        format!("⚖ {} · {}", judge.verdict, judge.score_label()),
        Style::default()
            .fg(band_color(judge))
            .add_modifier(Modifier::BOLD),
    )
}
