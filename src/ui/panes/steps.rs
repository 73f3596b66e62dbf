//! Step list pane

use super::{clamp_scroll, pane_block};
use crate::trace::TraceStep;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

fn step_line(index: usize, step: &TraceStep, is_current: bool) -> Line<'static> {
    let base = if is_current {
        Style::default()
            .bg(DEFAULT_THEME.current_line_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::styled(
            if is_current { "▶ " } else { "  " },
            base.fg(DEFAULT_THEME.cursor),
        ),
        Span::styled(format!("{:>4} ", index + 1), base.fg(DEFAULT_THEME.muted)),
        Span::styled(format!("line {:<4}", step.line), base.fg(DEFAULT_THEME.text)),
        Span::styled(
            format!(" call {}", step.call_count),
            base.fg(DEFAULT_THEME.muted),
        ),
    ];
    if let Some(ret) = &step.return_value {
        spans.push(Span::styled(
            format!("  ↖ {}", ret),
            base.fg(DEFAULT_THEME.return_value),
        ));
    }
    Line::from(spans)
}

/// Keep `position` inside the window that starts at `offset`
fn follow_cursor(offset: &mut usize, position: usize, visible: usize) {
    if position < *offset {
        *offset = position;
    } else if position >= *offset + visible {
        *offset = position + 1 - visible;
    }
}

/// Render the step list, scrolled so the current step is visible
pub fn render_steps_pane(
    frame: &mut Frame,
    area: Rect,
    steps: &[TraceStep],
    position: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Steps ", is_focused);
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if steps.is_empty() {
        let list = List::new(vec![ListItem::new("(no steps)")
            .style(Style::default().fg(DEFAULT_THEME.muted))])
        .block(block);
        frame.render_widget(list, area);
        return;
    }

    if !is_focused {
        follow_cursor(scroll_offset, position, visible_height);
    }
    clamp_scroll(scroll_offset, steps.len(), visible_height);

    let items: Vec<ListItem> = steps
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(i, step)| ListItem::new(step_line(i, step, i == position)))
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn test_follow_cursor() {
        let mut offset = 0;
        follow_cursor(&mut offset, 12, 5);
        assert_eq!(offset, 8);
        follow_cursor(&mut offset, 9, 5);
        assert_eq!(offset, 8);
        follow_cursor(&mut offset, 2, 5);
        assert_eq!(offset, 2);
    }

    #[test]
    fn test_return_step_line() {
        let step = TraceStep {
            call_count: 2,
            line: 7,
            context: IndexMap::new(),
            increment_call_count: false,
            return_value: Some(3.0.into()),
        };
        let text: String = step_line(0, &step, true)
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(text, "▶    1 line 7    call 2  ↖ 3");
    }
}
