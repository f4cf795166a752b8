use once_cell::sync::Lazy;
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};
use syntect::{
    easy::HighlightLines,
    highlighting::{FontStyle, Theme, ThemeSet},
    parsing::SyntaxSet,
    util::LinesWithEndings,
};

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME: Lazy<Theme> = Lazy::new(|| {
    let mut themes = ThemeSet::load_defaults();
    themes
        .themes
        .remove("base16-ocean.dark")
        .unwrap_or_default()
});

/// Highlights a fenced code block, one span list per source line.
///
/// Unknown languages fall back to plain text in `fallback`.
pub fn highlight_code(code: &str, lang: &str, fallback: Style) -> Vec<Vec<Span<'static>>> {
    let syntax = SYNTAX_SET
        .find_syntax_by_token(lang.trim())
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, &THEME);

    LinesWithEndings::from(code)
        .map(|line| match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => ranges
                .into_iter()
                .filter_map(|(style, text)| {
                    let text = text.trim_end_matches(['\n', '\r']);
                    if text.is_empty() {
                        None
                    } else {
                        Some(Span::styled(text.replace('\t', "    "), convert_style(style)))
                    }
                })
                .collect(),
            Err(e) => {
                log::debug!("Highlighting failed for {}: {}", lang, e);
                vec![Span::styled(
                    line.trim_end_matches(['\n', '\r']).replace('\t', "    "),
                    fallback,
                )]
            }
        })
        .collect()
}

fn convert_style(style: syntect::highlighting::Style) -> Style {
    let fg = style.foreground;
    let mut out = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(spans: &[Span<'_>]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_highlight_keeps_text_per_line() {
        let code = "fn main() {\n    println!(\"hi\");\n}\n";
        let lines = highlight_code(code, "rust", Style::default());
        assert_eq!(lines.len(), 3);
        assert_eq!(line_text(&lines[0]), "fn main() {");
        assert_eq!(line_text(&lines[1]), "    println!(\"hi\");");
        assert_eq!(line_text(&lines[2]), "}");
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let lines = highlight_code("just words\n", "no-such-lang", Style::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "just words");
    }
}
