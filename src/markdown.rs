//! Markdown rendering for chat answers.
//!
//! Answers are CommonMark with the math extension (`$inline$`, `$$display$$`).
//! [`render_lines`] turns them into word-wrapped ratatui lines for the terminal;
//! [`render_html`] produces sanitized HTML for export.

use crate::highlight::highlight_code;
use crate::math::latex_to_unicode;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

pub fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_MATH
}

/// Renders markdown to terminal lines no wider than `width` columns.
pub fn render_lines(markdown: &str, width: usize, base: Style) -> Vec<Line<'static>> {
    let mut writer = LineWriter::new(width.max(8), base);
    for event in Parser::new_ext(markdown, parser_options()) {
        writer.event(event);
    }
    writer.finish()
}

/// Renders markdown to HTML with raw HTML escaped and script links removed.
///
/// Library API for embedding answers elsewhere; the terminal client only uses
/// [`render_lines`].
pub fn render_html(markdown: &str) -> String {
    let events = Parser::new_ext(markdown, parser_options()).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: sanitize_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: sanitize_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn sanitize_url(url: CowStr<'_>) -> CowStr<'_> {
    let scheme = url.trim_start().to_ascii_lowercase();
    let blocked = ["javascript:", "vbscript:", "data:"];
    if blocked.iter().any(|prefix| scheme.starts_with(prefix)) {
        CowStr::Borrowed("")
    } else {
        url
    }
}

fn code_style() -> Style {
    Style::default().fg(Color::Rgb(209, 154, 102))
}

fn math_style() -> Style {
    Style::default()
        .fg(Color::Rgb(198, 160, 246))
        .add_modifier(Modifier::ITALIC)
}

fn dim_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Open container, popped on the matching end event.
enum Open {
    Paragraph,
    Heading,
    BlockQuote,
    CodeBlock,
    List,
    Item,
    Table,
    TableHead,
    TableRow,
    TableCell,
    Styled,
    Link { dest: String, start: usize },
    Image,
    Other,
}

#[derive(Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    header_rows: usize,
    row: Vec<String>,
    cell: String,
}

struct LineWriter {
    width: usize,
    base: Style,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    open: Vec<Open>,
    styles: Vec<Style>,
    lists: Vec<Option<u64>>,
    indents: Vec<usize>,
    item_marker: Option<String>,
    quote_depth: usize,
    code: Option<(String, String)>,
    table: Option<TableState>,
}

impl LineWriter {
    fn new(width: usize, base: Style) -> Self {
        Self {
            width,
            base,
            lines: Vec::new(),
            current: Vec::new(),
            open: Vec::new(),
            styles: vec![base],
            lists: Vec::new(),
            indents: Vec::new(),
            item_marker: None,
            quote_depth: 0,
            code: None,
            table: None,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or(self.base)
    }

    fn push_style(&mut self, patch: Style) {
        let next = self.style().patch(patch);
        self.styles.push(next);
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                if let Some(table) = self.table.as_mut() {
                    table.cell.push_str(&code);
                } else {
                    let style = self.style().patch(code_style());
                    self.current.push(Span::styled(code.to_string(), style));
                }
            }
            Event::InlineMath(tex) => {
                let rendered = latex_to_unicode(&tex);
                if let Some(table) = self.table.as_mut() {
                    table.cell.push_str(&rendered);
                } else {
                    let style = self.style().patch(math_style());
                    self.current.push(Span::styled(rendered, style));
                }
            }
            Event::DisplayMath(tex) => self.display_math(&tex),
            Event::Html(raw) | Event::InlineHtml(raw) if self.table.is_some() => {
                self.decorate(raw.replace('\n', " "));
            }
            Event::Html(raw) | Event::InlineHtml(raw) => {
                let style = self.style().patch(dim_style());
                for (i, part) in raw.split('\n').enumerate() {
                    if i > 0 {
                        self.flush();
                    }
                    if !part.is_empty() {
                        self.current.push(Span::styled(part.to_string(), style));
                    }
                }
            }
            Event::FootnoteReference(label) => self.decorate(format!("[^{}]", label)),
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                let (prefix, _) = self.prefixes();
                let rule_width = self.width.saturating_sub(prefix.width()).max(1);
                self.lines.push(Line::from(vec![
                    Span::styled(prefix, self.base),
                    Span::styled("─".repeat(rule_width), dim_style()),
                ]));
                self.blank();
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                let style = self.style().add_modifier(Modifier::BOLD);
                self.current.push(Span::styled(marker.to_string(), style));
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let open = match tag {
            Tag::Paragraph => Open::Paragraph,
            Tag::Heading { level, .. } => {
                self.flush();
                let patch = match level as usize {
                    1 => Style::default()
                        .fg(Color::LightMagenta)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    2 => Style::default()
                        .fg(Color::LightCyan)
                        .add_modifier(Modifier::BOLD),
                    _ => Style::default().add_modifier(Modifier::BOLD),
                };
                self.push_style(patch);
                Open::Heading
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
                Open::BlockQuote
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.split_whitespace().next().unwrap_or("").to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.code = Some((lang, String::new()));
                Open::CodeBlock
            }
            Tag::List(first) => {
                self.flush();
                self.lists.push(first);
                Open::List
            }
            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.indents.push(marker.width());
                self.item_marker = Some(marker);
                Open::Item
            }
            Tag::Table(_) => {
                self.flush();
                self.table = Some(TableState::default());
                Open::Table
            }
            Tag::TableHead => Open::TableHead,
            Tag::TableRow => Open::TableRow,
            Tag::TableCell => Open::TableCell,
            Tag::Emphasis => {
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
                Open::Styled
            }
            Tag::Strong => {
                self.push_style(Style::default().add_modifier(Modifier::BOLD));
                Open::Styled
            }
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT));
                Open::Styled
            }
            Tag::Link { dest_url, .. } => {
                self.push_style(
                    Style::default()
                        .fg(Color::LightBlue)
                        .add_modifier(Modifier::UNDERLINED),
                );
                let start = match self.table.as_ref() {
                    Some(table) => table.cell.len(),
                    None => self.current.len(),
                };
                Open::Link {
                    dest: dest_url.to_string(),
                    start,
                }
            }
            Tag::Image { .. } => {
                self.decorate("[image: ".to_string());
                Open::Image
            }
            _ => Open::Other,
        };
        self.open.push(open);
    }

    fn end(&mut self) {
        let Some(open) = self.open.pop() else {
            return;
        };
        match open {
            Open::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            Open::Heading => {
                self.flush();
                self.styles.pop();
                self.blank();
            }
            Open::BlockQuote => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.styles.pop();
            }
            Open::CodeBlock => self.code_block(),
            Open::List => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            Open::Item => {
                self.flush();
                self.indents.pop();
                self.item_marker = None;
            }
            Open::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    let cell = std::mem::take(&mut table.cell);
                    table.row.push(cell.trim().to_string());
                }
            }
            Open::TableHead | Open::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                    if matches!(open, Open::TableHead) {
                        table.header_rows = table.rows.len();
                    }
                }
            }
            Open::Table => self.table_block(),
            Open::Styled => {
                self.styles.pop();
            }
            Open::Link { dest, start } => {
                self.styles.pop();
                let label: String = match self.table.as_ref() {
                    Some(table) => table.cell.get(start..).unwrap_or_default().to_string(),
                    None => self
                        .current
                        .get(start..)
                        .map(|spans| spans.iter().map(|s| s.content.as_ref()).collect())
                        .unwrap_or_default(),
                };
                if !dest.is_empty() && dest != label {
                    self.decorate(format!(" ({})", dest));
                }
            }
            Open::Image => self.decorate("]".to_string()),
            Open::Other => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some((_, buffer)) = self.code.as_mut() {
            buffer.push_str(text);
        } else if let Some(table) = self.table.as_mut() {
            table.cell.push_str(text);
        } else {
            let style = self.style();
            self.current.push(Span::styled(text.to_string(), style));
        }
    }

    /// Dimmed inline text that is not part of the source, such as link targets.
    fn decorate(&mut self, text: String) {
        if let Some(table) = self.table.as_mut() {
            table.cell.push_str(&text);
        } else {
            let style = self.style().patch(dim_style());
            self.current.push(Span::styled(text, style));
        }
    }

    fn display_math(&mut self, tex: &str) {
        self.flush();
        let (prefix, _) = self.prefixes();
        let available = self.width.saturating_sub(prefix.width());
        for row in tex.lines().filter(|l| !l.trim().is_empty()) {
            let rendered = latex_to_unicode(row);
            let pad = available.saturating_sub(rendered.width()) / 2;
            self.lines.push(Line::from(vec![
                Span::styled(prefix.clone(), self.base),
                Span::raw(" ".repeat(pad)),
                Span::styled(rendered, math_style()),
            ]));
        }
    }

    fn code_block(&mut self) {
        let Some((lang, code)) = self.code.take() else {
            return;
        };
        let (prefix, _) = self.prefixes();
        for spans in highlight_code(&code, &lang, self.base.patch(code_style())) {
            let mut line = vec![
                Span::styled(prefix.clone(), self.base),
                Span::styled("▎ ".to_string(), dim_style()),
            ];
            line.extend(spans);
            self.lines.push(Line::from(line));
        }
        if self.lists.is_empty() {
            self.blank();
        }
    }

    fn table_block(&mut self) {
        let Some(table) = self.table.take() else {
            return;
        };
        let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &table.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }

        let (prefix, _) = self.prefixes();
        let header_style = self.base.add_modifier(Modifier::BOLD);
        for (index, row) in table.rows.iter().enumerate() {
            let style = if index < table.header_rows {
                header_style
            } else {
                self.base
            };
            let cells: Vec<String> = (0..columns)
                .map(|i| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    format!("{}{}", cell, " ".repeat(widths[i] - cell.width()))
                })
                .collect();
            self.lines.push(Line::from(vec![
                Span::styled(prefix.clone(), self.base),
                Span::styled(cells.join(" │ ").trim_end().to_string(), style),
            ]));
            if index + 1 == table.header_rows {
                let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
                self.lines.push(Line::from(vec![
                    Span::styled(prefix.clone(), self.base),
                    Span::styled(rule.join("─┼─"), dim_style()),
                ]));
            }
        }
        self.blank();
    }

    /// Prefix for the first wrapped row and for the rows after it.
    fn prefixes(&mut self) -> (String, String) {
        let quote = "│ ".repeat(self.quote_depth);
        let indent: usize = self.indents.iter().sum();
        let rest = format!("{}{}", quote, " ".repeat(indent));
        let first = match self.item_marker.take() {
            Some(marker) => {
                let outer = indent.saturating_sub(marker.width());
                format!("{}{}{}", quote, " ".repeat(outer), marker)
            }
            None => rest.clone(),
        };
        (first, rest)
    }

    fn flush(&mut self) {
        if self.current.iter().all(|s| s.content.trim().is_empty()) {
            self.current.clear();
            return;
        }
        let spans = std::mem::take(&mut self.current);
        let (first, rest) = self.prefixes();
        let available = self.width.saturating_sub(rest.width().max(first.width())).max(1);

        for (i, row) in wrap_spans(spans, available).into_iter().enumerate() {
            let prefix = if i == 0 { first.clone() } else { rest.clone() };
            let prefix_style = if self.quote_depth > 0 {
                dim_style()
            } else {
                self.base
            };
            let mut line = vec![Span::styled(prefix, prefix_style)];
            line.extend(row);
            self.lines.push(Line::from(line));
        }
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| l.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Greedy word wrap over styled spans, measured in display columns.
pub fn wrap_spans(spans: Vec<Span<'static>>, width: usize) -> Vec<Vec<Span<'static>>> {
    let width = width.max(1);
    let mut rows: Vec<Vec<Span<'static>>> = Vec::new();
    let mut row: Vec<Span<'static>> = Vec::new();
    let mut row_width = 0usize;
    let mut pending_space: Option<Style> = None;

    for span in spans {
        let style = span.style;
        for token in split_tokens(&span.content) {
            if token.chars().all(char::is_whitespace) {
                if row_width > 0 {
                    pending_space = Some(style);
                }
                continue;
            }

            let token_width = token.width();
            let space = usize::from(pending_space.is_some());
            if row_width > 0 && row_width + space + token_width > width {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
                pending_space = None;
            }
            if let Some(space_style) = pending_space.take() {
                push_merged(&mut row, " ", space_style);
                row_width += 1;
            }

            if token_width > width {
                for c in token.chars() {
                    let w = c.to_string().width();
                    if row_width > 0 && row_width + w > width {
                        rows.push(std::mem::take(&mut row));
                        row_width = 0;
                    }
                    push_merged(&mut row, &c.to_string(), style);
                    row_width += w;
                }
            } else {
                push_merged(&mut row, token, style);
                row_width += token_width;
            }
        }
    }

    if !row.is_empty() {
        rows.push(row);
    }
    rows
}

fn split_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let is_space = c.is_whitespace();
        if in_space.is_some_and(|s| s != is_space) {
            tokens.push(&text[start..i]);
            start = i;
        }
        in_space = Some(is_space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

fn push_merged(row: &mut Vec<Span<'static>>, text: &str, style: Style) {
    match row.last_mut() {
        Some(last) if last.style == style => last.content.to_mut().push_str(text),
        _ => row.push(Span::styled(text.to_string(), style)),
    }
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

    fn render(markdown: &str, width: usize) -> Vec<String> {
        plain(&render_lines(markdown, width, Style::default()))
    }

    #[test]
    fn test_plain_paragraph() {
        assert_eq!(render("Hello **world**", 80), vec!["Hello world"]);
    }

    #[test]
    fn test_strong_text_is_bold() {
        let lines = render_lines("Hello **world**", 80, Style::default());
        let bold = lines[0]
            .spans
            .iter()
            .find(|s| s.content.contains("world"))
            .unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_wraps_at_word_boundaries() {
        assert_eq!(
            render("one two three four", 9),
            vec!["one two", "three", "four"]
        );
    }

    #[test]
    fn test_long_words_are_split() {
        assert_eq!(render("abcdefghijkl", 8), vec!["abcdefgh", "ijkl"]);
    }

    #[test]
    fn test_headings_and_paragraphs_are_separated() {
        assert_eq!(render("# Title\n\nBody", 40), vec!["Title", "", "Body"]);
    }

    #[test]
    fn test_lists() {
        assert_eq!(render("- a\n- b", 40), vec!["• a", "• b"]);
        assert_eq!(render("1. x\n2. y", 40), vec!["1. x", "2. y"]);
        assert_eq!(render("- a\n  - b", 40), vec!["• a", "  • b"]);
    }

    #[test]
    fn test_task_list_markers() {
        assert_eq!(render("- [x] done\n- [ ] todo", 40), vec!["• [x] done", "• [ ] todo"]);
    }

    #[test]
    fn test_block_quote() {
        assert_eq!(render("> quoted", 40), vec!["│ quoted"]);
    }

    #[test]
    fn test_code_block_keeps_lines() {
        let lines = render("```rust\nlet x = 1;\nlet y = 2;\n```", 40);
        assert_eq!(lines, vec!["▎ let x = 1;", "▎ let y = 2;"]);
    }

    #[test]
    fn test_inline_math() {
        assert_eq!(render("Energy $E = mc^2$ holds", 40), vec!["Energy E = mc² holds"]);
    }

    #[test]
    fn test_display_math_is_centered() {
        let lines = render("$$\\frac{a}{b}$$", 21);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], format!("{}a/b", " ".repeat(9)));
    }

    #[test]
    fn test_link_shows_destination() {
        assert_eq!(
            render("[docs](https://example.com)", 80),
            vec!["docs (https://example.com)"]
        );
        assert_eq!(
            render("<https://example.com>", 80),
            vec!["https://example.com"]
        );
    }

    #[test]
    fn test_table() {
        let lines = render("| a | bb |\n|---|---|\n| 1 | 2 |", 40);
        assert_eq!(lines, vec!["a │ bb", "──┼───", "1 │ 2"]);
    }

    #[test]
    fn test_table_with_link() {
        let lines = render("| site |\n|---|\n| [docs](https://x.io) |\n\nAfter", 60);
        assert_eq!(
            lines,
            vec![
                "site".to_string(),
                "─".repeat(19),
                "docs (https://x.io)".to_string(),
                String::new(),
                "After".to_string(),
            ]
        );
    }

    #[test]
    fn test_table_with_image() {
        let lines = render("| pic |\n|---|\n| ![alt](a.png) |\n\nAfter", 60);
        assert_eq!(lines[2], "[image: alt]");
        assert_eq!(lines.last().map(String::as_str), Some("After"));
    }

    #[test]
    fn test_rule() {
        let lines = render("above\n\n---\n\nbelow", 10);
        assert_eq!(lines, vec!["above", "", "─".repeat(10).as_str(), "", "below"]);
    }

    #[test]
    fn test_html_escapes_raw_html() {
        let html = render_html("<script>alert(1)</script>\n\nhi <b>x</b>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;b&gt;"));
    }

    #[test]
    fn test_html_drops_script_links() {
        let html = render_html("[click](javascript:alert(1))");
        assert!(!html.contains("javascript:"));
        assert!(html.contains("click"));
    }

    #[test]
    fn test_html_renders_math_spans() {
        let html = render_html("inline $x^2$ and\n\n$$y$$");
        assert!(html.contains("math-inline"));
        assert!(html.contains("math-display"));
    }
}
