//! Source pane with syntax highlighting
//!
//! Shows the traced function's source and highlights the line the current
//! step recorded. The highlighted line stays at a fixed row while stepping;
//! scrolling moves that row instead of the text.

use super::pane_block;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Single-pass highlighter for one line of JavaScript
///
/// Works on whole lines, so block comments and template literals spanning
/// lines are only coloured on the line that opens them.
fn highlight_source_code(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut word_start: Option<usize> = None;
    let mut chars = line.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_alphanumeric() || c == '_' || c == '$' {
            word_start.get_or_insert(i);
            continue;
        }
        push_word(&mut spans, line, word_start.take(), i, c);

        if c == '/' && chars.peek().is_some_and(|&(_, n)| n == '/') {
            spans.push(Span::styled(
                &line[i..],
                Style::default().fg(DEFAULT_THEME.muted),
            ));
            return Line::from(spans);
        }

        if matches!(c, '"' | '\'' | '`') {
            let mut end = line.len();
            while let Some((j, d)) = chars.next() {
                if d == '\\' {
                    chars.next();
                } else if d == c {
                    end = j + d.len_utf8();
                    break;
                }
            }
            spans.push(Span::styled(
                &line[i..end],
                Style::default().fg(DEFAULT_THEME.string),
            ));
            continue;
        }

        let style = match c {
            '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.accent),
            _ => Style::default().fg(DEFAULT_THEME.text),
        };
        spans.push(Span::styled(&line[i..i + c.len_utf8()], style));
    }
    push_word(&mut spans, line, word_start, line.len(), ' ');

    Line::from(spans)
}

fn push_word<'a>(
    spans: &mut Vec<Span<'a>>,
    line: &'a str,
    start: Option<usize>,
    end: usize,
    next: char,
) {
    if let Some(start) = start {
        let word = &line[start..end];
        spans.push(Span::styled(word, keyword_style(word, next == '(')));
    }
}

fn keyword_style(word: &str, is_call: bool) -> Style {
    match word {
        "function" | "return" | "if" | "else" | "while" | "for" | "do" | "break"
        | "continue" | "var" | "let" | "const" | "new" | "typeof" | "export" | "default"
        | "of" | "in" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        "true" | "false" | "null" | "undefined" | "NaN" | "Infinity" => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if word.starts_with(|c: char| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if is_call => Style::default().fg(DEFAULT_THEME.call),
        _ => Style::default().fg(DEFAULT_THEME.text),
    }
}

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    /// Visual row of the highlighted line; `None` until the first render
    pub target_line_row: Option<usize>,
}

/// Render the source pane; `current_line` is 1-based, 0 for none
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    current_line: usize,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let block = pane_block(" Source ", is_focused);

    let lines: Vec<&str> = source_code.lines().collect();
    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    if current_line > 0 && current_line <= total_lines {
        scroll_state.offset = (current_line - 1).saturating_sub(target_row);
        super::clamp_scroll(&mut scroll_state.offset, total_lines, visible_height);
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = line_num == current_line;

            let (marker, num_style) = if is_current {
                (
                    "▶",
                    Style::default()
                        .fg(DEFAULT_THEME.cursor)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                (" ", Style::default().fg(DEFAULT_THEME.muted))
            };

            let mut content = highlight_source_code(line);
            if is_current {
                let bg = Style::default().bg(DEFAULT_THEME.current_line_bg);
                for span in &mut content.spans {
                    span.style = span.style.patch(bg);
                }
            }

            let mut spans = vec![Span::styled(format!("{}{:4} ", marker, line_num), num_style)];
            spans.extend(content.spans);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_highlight_keeps_text() {
        let source = "const s = 'a\\'b'; // done";
        let line = highlight_source_code(source);
        assert_eq!(text(&line).concat(), source);
        assert!(text(&line).contains(&"'a\\'b'".to_string()));
        assert_eq!(text(&line).last().map(String::as_str), Some("// done"));
    }

    #[test]
    fn test_keyword_and_call_styles() {
        let line = highlight_source_code("return f(x);");
        assert_eq!(line.spans[0].style.fg, Some(DEFAULT_THEME.keyword));
        assert_eq!(line.spans[2].content, "f");
        assert_eq!(line.spans[2].style.fg, Some(DEFAULT_THEME.call));
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let line = highlight_source_code("x = \"abc");
        assert_eq!(text(&line).last().map(String::as_str), Some("\"abc"));
    }
}
