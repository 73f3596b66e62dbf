//! Pane rendering for the trace viewer
//!
//! - [`source`]: the traced source with the current step's line highlighted
//! - [`context`]: tracked variables at the current step, plus call count
//!   and return value
//! - [`steps`]: the full step list with the cursor
//! - [`console`]: `console.log` output captured while tracing
//! - [`status`]: step counter, status message and key hints
//!
//! Each module exports a `render_*` function. Panes with scroll state take
//! it by `&mut` and clamp it while rendering, since only the renderer knows
//! the visible height.

pub mod console;
pub mod context;
pub mod source;
pub mod status;
pub mod steps;

pub use console::render_console_pane;
pub use context::{render_context_pane, ContextRenderData};
pub use source::{render_source_pane, SourceScrollState};
pub use status::{render_status_bar, StatusRenderData};
pub use steps::render_steps_pane;

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    style::{Modifier, Style},
    widgets::{Block, Borders},
};

/// Bordered block with the focus colour applied
pub(crate) fn pane_block(title: &str, is_focused: bool) -> Block<'_> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border)
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Clamp `offset` so a list of `total` rows fills a pane `visible` rows high
pub(crate) fn clamp_scroll(offset: &mut usize, total: usize, visible: usize) {
    if total > visible {
        *offset = (*offset).min(total - visible);
    } else {
        *offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_scroll() {
        let mut offset = usize::MAX;
        clamp_scroll(&mut offset, 10, 4);
        assert_eq!(offset, 6);

        clamp_scroll(&mut offset, 3, 4);
        assert_eq!(offset, 0);
    }
}
