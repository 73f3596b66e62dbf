//! Context pane: the tracked variables as the current step recorded them
//!
//! Values that differ from the previous step are highlighted, which makes
//! the effect of each statement visible without comparing by eye.

use super::{clamp_scroll, pane_block};
use crate::trace::{TraceStep, TraceValue};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

/// Data needed to render the context pane
pub struct ContextRenderData<'a> {
    pub function_name: &'a str,
    pub step: Option<&'a TraceStep>,
    pub previous: Option<&'a TraceStep>,
}

fn value_style(value: &TraceValue) -> Style {
    let color = match value {
        TraceValue::Number(_) | TraceValue::Bool(_) => DEFAULT_THEME.number,
        TraceValue::String(_) => DEFAULT_THEME.string,
        TraceValue::Undefined | TraceValue::Null => DEFAULT_THEME.muted,
        TraceValue::Array(_) | TraceValue::Object(_) => DEFAULT_THEME.text,
    };
    Style::default().fg(color)
}

fn context_lines(data: &ContextRenderData) -> Vec<Line<'static>> {
    let Some(step) = data.step else {
        return vec![Line::styled(
            "(no steps recorded)",
            Style::default().fg(DEFAULT_THEME.muted),
        )];
    };

    let mut lines = vec![Line::from(vec![
        Span::styled("▸ ", Style::default().fg(DEFAULT_THEME.cursor)),
        Span::styled(
            format!("{}()", data.function_name),
            Style::default()
                .fg(DEFAULT_THEME.call)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  line {} │ call #{}", step.line, step.call_count),
            Style::default().fg(DEFAULT_THEME.muted),
        ),
    ])];

    if step.increment_call_count {
        lines.push(Line::styled(
            "  ↪ entered",
            Style::default().fg(DEFAULT_THEME.muted),
        ));
    }

    if step.context.is_empty() {
        lines.push(Line::styled(
            "  (nothing tracked yet)",
            Style::default().fg(DEFAULT_THEME.muted),
        ));
    }

    let name_width = step.context.keys().map(|k| k.chars().count()).max().unwrap_or(0);
    for (name, value) in &step.context {
        let before = data.previous.and_then(|p| p.context.get(name));
        let changed = data.previous.is_some() && before != Some(value);

        let mut style = value_style(value);
        if changed {
            style = style
                .fg(DEFAULT_THEME.changed)
                .add_modifier(Modifier::BOLD);
        }

        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!("{:width$}", name, width = name_width),
                Style::default().fg(DEFAULT_THEME.name),
            ),
            Span::styled(" = ", Style::default().fg(DEFAULT_THEME.muted)),
            Span::styled(value.to_string(), style),
            Span::styled(
                if changed { "  *" } else { "" },
                Style::default().fg(DEFAULT_THEME.changed),
            ),
        ]));
    }

    if let Some(ret) = &step.return_value {
        lines.push(Line::from(vec![
            Span::styled("  ↖ return ", Style::default().fg(DEFAULT_THEME.return_value)),
            Span::styled(
                ret.to_string(),
                Style::default()
                    .fg(DEFAULT_THEME.return_value)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    lines
}

/// Render the context pane
pub fn render_context_pane(
    frame: &mut Frame,
    area: Rect,
    data: ContextRenderData,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let lines = context_lines(&data);
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    clamp_scroll(scroll_offset, lines.len(), visible_height);

    let items: Vec<ListItem> = lines
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(ListItem::new)
        .collect();

    frame.render_widget(
        List::new(items).block(pane_block(" Context ", is_focused)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn step(context: Vec<(&str, TraceValue)>, return_value: Option<TraceValue>) -> TraceStep {
        TraceStep {
            call_count: 1,
            line: 3,
            context: context
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<IndexMap<_, _>>(),
            increment_call_count: false,
            return_value,
        }
    }

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_changed_values_are_marked() {
        let previous = step(vec![("a", 2.0.into()), ("b", TraceValue::Undefined)], None);
        let current = step(vec![("a", 2.0.into()), ("b", 3.0.into())], None);
        let data = ContextRenderData {
            function_name: "f",
            step: Some(&current),
            previous: Some(&previous),
        };

        let lines: Vec<String> = context_lines(&data).iter().map(plain).collect();
        assert_eq!(lines[0], "▸ f()  line 3 │ call #1");
        assert_eq!(lines[1], "  a = 2");
        assert_eq!(lines[2], "  b = 3  *");
    }

    #[test]
    fn test_return_value_line() {
        let current = step(vec![("s", "hi".into())], Some("hi".into()));
        let data = ContextRenderData {
            function_name: "f",
            step: Some(&current),
            previous: None,
        };

        let lines: Vec<String> = context_lines(&data).iter().map(plain).collect();
        assert_eq!(lines[1], "  s = \"hi\"");
        assert_eq!(lines.last().map(String::as_str), Some("  ↖ return \"hi\""));
    }

    #[test]
    fn test_no_steps() {
        let data = ContextRenderData {
            function_name: "f",
            step: None,
            previous: None,
        };
        assert_eq!(plain(&context_lines(&data)[0]), "(no steps recorded)");
    }
}
