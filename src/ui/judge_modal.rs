use crate::chat_message::band_color;
use crate::markdown::render_lines;
use crate::models::JudgeResponse;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const BAR_WIDTH: usize = 20;

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn score_bar(judge: &JudgeResponse) -> Span<'static> {
    let filled = ((judge.score.clamp(0.0, 10.0) / 10.0) * BAR_WIDTH as f64).round() as usize;
    Span::styled(
        format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled)),
        Style::default().fg(band_color(judge)),
    )
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    ))
}

/// Lines shown inside the review modal, wrapped to `width`.
pub fn modal_lines(judge: &JudgeResponse, width: usize) -> Vec<Line<'static>> {
    let color = band_color(judge);
    let body = Style::default().fg(Color::White);

    let mut lines = vec![
        Line::from(vec![
            Span::raw("Verdict: "),
            Span::styled(
                judge.verdict.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw("Score:   "),
            score_bar(judge),
            Span::raw(" "),
            Span::styled(judge.score_label(), Style::default().fg(color)),
        ]),
        Line::default(),
        section("Overall feedback"),
    ];
    lines.extend(render_lines(&judge.overall_feedback, width, body));
    lines.push(Line::default());
    lines.push(section("Recommended changes"));
    lines.extend(render_lines(&judge.recommended_changes, width, body));
    lines
}

pub fn draw_judge_modal(f: &mut Frame<'_>, judge: &JudgeResponse, scroll: u16) {
    let area = centered_rect(70, 70, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Review ")
        .title_bottom(Line::from(" Esc to close ").alignment(Alignment::Right))
        .border_style(Style::default().fg(band_color(judge)));

    let width = area.width.saturating_sub(2) as usize;
    let lines = modal_lines(judge, width);
    let max_scroll = lines.len().saturating_sub(area.height.saturating_sub(2) as usize);
    let scroll = scroll.min(u16::try_from(max_scroll).unwrap_or(u16::MAX));

    f.render_widget(
        Paragraph::new(lines).block(block).scroll((scroll, 0)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect()
    }

    #[test]
    fn test_modal_lists_every_field() {
        let judge = JudgeResponse {
            verdict: "REVISE".to_string(),
            score: 5.0,
            overall_feedback: "Mostly **right**".to_string(),
            recommended_changes: "- cite sources".to_string(),
        };
        let lines = plain(&modal_lines(&judge, 40));

        assert_eq!(lines[0], "Verdict: REVISE");
        assert!(lines[1].ends_with("5/10"));
        assert!(lines[1].contains(&"█".repeat(10)));
        assert!(lines.contains(&"Mostly right".to_string()));
        assert!(lines.iter().any(|l| l.contains("cite sources")));
    }

    #[test]
    fn test_score_bar_clamps_out_of_range_scores() {
        let mut judge = JudgeResponse {
            verdict: "APPROVED".to_string(),
            score: 14.0,
            overall_feedback: String::new(),
            recommended_changes: String::new(),
        };
        assert_eq!(score_bar(&judge).content, "█".repeat(BAR_WIDTH));

        judge.score = -3.0;
        assert_eq!(score_bar(&judge).content, "░".repeat(BAR_WIDTH));
    }
}
