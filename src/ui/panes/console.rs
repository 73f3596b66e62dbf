//! Console output pane

use super::{clamp_scroll, pane_block};
use crate::interpreter::ConsoleLine;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the captured `console.log` output
///
/// Lines printed by the current step's source line are emphasized.
pub fn render_console_pane(
    frame: &mut Frame,
    area: Rect,
    lines: &[ConsoleLine],
    current_line: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Console ", is_focused);

    if lines.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.muted));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    clamp_scroll(scroll_offset, lines.len(), visible_height);

    let items: Vec<ListItem> = lines
        .iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|line| {
            let text_color = if line.location.line == current_line {
                DEFAULT_THEME.cursor
            } else {
                DEFAULT_THEME.text
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>4} │ ", line.location.line),
                    Style::default().fg(DEFAULT_THEME.muted),
                ),
                Span::styled(line.text.as_str(), Style::default().fg(text_color)),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
