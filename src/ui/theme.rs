//! Viewer colors, by the role they play in the trace panes

use ratatui::style::Color;

pub struct Theme {
    pub text: Color,
    /// Line numbers, separators, `undefined`/`null`
    pub muted: Color,
    pub accent: Color,
    /// The step cursor and the play badge
    pub cursor: Color,
    pub at_start: Color,
    pub at_end: Color,

    // Source highlighting
    pub keyword: Color,
    pub string: Color,
    pub number: Color,
    pub call: Color,

    pub border_focused: Color,
    pub border: Color,
    pub current_line_bg: Color,

    // Context pane
    pub name: Color,
    pub changed: Color,
    pub return_value: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    text: Color::Rgb(235, 219, 178),
    muted: Color::Rgb(124, 111, 100),
    accent: Color::Rgb(131, 165, 152),
    cursor: Color::Rgb(254, 128, 25),
    at_start: Color::Rgb(184, 187, 38),
    at_end: Color::Rgb(251, 73, 52),

    keyword: Color::Rgb(250, 189, 47),
    string: Color::Rgb(184, 187, 38),
    number: Color::Rgb(211, 134, 155),
    call: Color::Rgb(142, 192, 124),

    border_focused: Color::Rgb(250, 189, 47),
    border: Color::Rgb(80, 73, 69),
    current_line_bg: Color::Rgb(60, 56, 54),

    name: Color::Rgb(131, 165, 152),
    changed: Color::Rgb(254, 128, 25),
    return_value: Color::Rgb(211, 134, 155),
};
