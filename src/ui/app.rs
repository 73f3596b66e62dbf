//! Viewer state and event loop

use crate::interpreter::ConsoleLine;
use crate::pipeline::TraceRun;
use crate::trace::{TraceError, TraceTimeline};
use crate::ui::panes::{self, ContextRenderData, SourceScrollState, StatusRenderData};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

const PLAY_INTERVAL: Duration = Duration::from_millis(600);

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Context,
    Steps,
    Console,
}

impl FocusedPane {
    /// Clockwise: source -> console -> context -> steps
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Console,
            FocusedPane::Console => FocusedPane::Context,
            FocusedPane::Context => FocusedPane::Steps,
            FocusedPane::Steps => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    pub timeline: TraceTimeline,
    pub function_name: String,
    pub console: Vec<ConsoleLine>,

    pub focused_pane: FocusedPane,

    pub source_scroll: SourceScrollState,
    pub context_scroll: usize,
    pub steps_scroll: usize,
    pub console_scroll: usize,

    pub should_quit: bool,
    pub status_message: String,

    pub is_playing: bool,
    pub last_play_time: Instant,
    /// Debounces key repeat on space
    pub last_space_press: Option<Instant>,
}

impl App {
    pub fn new(run: TraceRun) -> Self {
        let status_message = if run.output.steps.is_empty() {
            "No steps recorded".to_string()
        } else {
            format!("Traced {}()", run.instrumented.function_name)
        };

        App {
            timeline: TraceTimeline::new(run.output),
            function_name: run.instrumented.function_name,
            console: run.console,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState::default(),
            context_scroll: 0,
            steps_scroll: 0,
            console_scroll: 0,
            should_quit: false,
            status_message,
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: None,
        }
    }

    /// Line recorded by the current step, 0 when there are no steps
    pub fn current_line(&self) -> usize {
        self.timeline.current().map_or(0, |step| step.line)
    }

    /// Run the event loop until the user quits
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= PLAY_INTERVAL {
                self.tick_playback();
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Advance one step in play mode, stopping at the end
    pub fn tick_playback(&mut self) {
        if self.timeline.step_forward().is_ok() {
            self.status_message = "Playing...".to_string();
        } else {
            self.is_playing = false;
            self.status_message = "Playback complete".to_string();
        }
        self.last_play_time = Instant::now();
    }

    pub(crate) fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        // Left: source over console
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        // Right: context over steps
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(columns[1]);

        let current_line = self.current_line();
        let position = self.timeline.position();
        let steps = self.timeline.steps();

        panes::render_source_pane(
            frame,
            left_rows[0],
            &self.timeline.output().code,
            current_line,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        panes::render_console_pane(
            frame,
            left_rows[1],
            &self.console,
            current_line,
            self.focused_pane == FocusedPane::Console,
            &mut self.console_scroll,
        );

        panes::render_context_pane(
            frame,
            right_rows[0],
            ContextRenderData {
                function_name: &self.function_name,
                step: steps.get(position),
                previous: position.checked_sub(1).and_then(|p| steps.get(p)),
            },
            self.focused_pane == FocusedPane::Context,
            &mut self.context_scroll,
        );

        panes::render_steps_pane(
            frame,
            right_rows[1],
            steps,
            position,
            self.focused_pane == FocusedPane::Steps,
            &mut self.steps_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            StatusRenderData {
                message: &self.status_message,
                position,
                total_steps: self.timeline.len(),
                is_playing: self.is_playing,
            },
        );
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            // Number keys step forward N times
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1);
                let mut stepped = 0;
                for _ in 0..n {
                    if self.timeline.step_forward().is_err() {
                        break;
                    }
                    stepped += 1;
                }
                self.status_message = format!("Stepped forward {} step(s)", stepped);
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                let result = self.timeline.step_backward().map(|_| ());
                self.report(result, "Stepped backward");
            }
            KeyCode::Right => {
                self.is_playing = false;
                let result = self.timeline.step_forward().map(|_| ());
                self.report(result, "Stepped forward");
            }
            KeyCode::Up => self.scroll(-1),
            KeyCode::Down => self.scroll(1),
            KeyCode::Char(' ') => self.toggle_play(),
            KeyCode::Enter => {
                self.is_playing = false;
                let result = self.timeline.jump_to_end().map(|_| ());
                self.report(result, "Jumped to end");
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                let result = self.timeline.rewind_to_start().map(|_| ());
                self.report(result, "Jumped to start");
            }
            _ => {}
        }
    }

    fn report(&mut self, result: Result<(), TraceError>, success: &str) {
        self.status_message = match result {
            Ok(()) => success.to_string(),
            Err(e) => format!("Cannot move: {}", e),
        };
    }

    fn toggle_play(&mut self) {
        if self
            .last_space_press
            .is_some_and(|t| t.elapsed() < Duration::from_millis(200))
        {
            return;
        }
        self.last_space_press = Some(Instant::now());

        self.is_playing = !self.is_playing;
        if self.is_playing {
            // First step happens on the next loop iteration
            self.last_play_time = Instant::now()
                .checked_sub(PLAY_INTERVAL)
                .unwrap_or_else(Instant::now);
            self.status_message = "Playing...".to_string();
        } else {
            self.status_message = "Paused".to_string();
        }
    }

    fn scroll(&mut self, delta: isize) {
        let offset = match self.focused_pane {
            FocusedPane::Source => {
                // Scrolling moves the highlighted row, not the text
                if let Some(row) = self.source_scroll.target_line_row {
                    self.source_scroll.target_line_row = Some(row.saturating_add_signed(-delta));
                }
                return;
            }
            FocusedPane::Context => &mut self.context_scroll,
            FocusedPane::Steps => &mut self.steps_scroll,
            FocusedPane::Console => &mut self.console_scroll,
        };
        *offset = offset.saturating_add_signed(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TraceConfig;
    use crate::memory::Value;
    use crate::pipeline::run_source;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    const SOURCE: &str = "export default function f(a) {\n  const b = a + 1;\n  console.log(b);\n  return b;\n}";

    fn app() -> App {
        let run = run_source(SOURCE, vec![Value::Number(2.0)], &TraceConfig::default()).unwrap();
        App::new(run)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_navigation_keys() {
        let mut app = app();
        let total = app.timeline.len();
        assert!(total >= 3);
        assert_eq!(app.timeline.position(), 0);

        press(&mut app, KeyCode::Right);
        assert_eq!(app.timeline.position(), 1);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.timeline.position(), total - 1);
        assert!(app.timeline.current().unwrap().is_return());

        press(&mut app, KeyCode::Right);
        assert_eq!(app.status_message, "Cannot move: already at the last step");

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.timeline.position(), 0);

        press(&mut app, KeyCode::Left);
        assert_eq!(app.timeline.position(), 0);

        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.timeline.position(), total - 1);
    }

    #[test]
    fn test_focus_cycles() {
        let mut app = app();
        for expected in [
            FocusedPane::Console,
            FocusedPane::Context,
            FocusedPane::Steps,
            FocusedPane::Source,
        ] {
            press(&mut app, KeyCode::Tab);
            assert_eq!(app.focused_pane, expected);
        }
    }

    #[test]
    fn test_playback_stops_at_end() {
        let mut app = app();
        press(&mut app, KeyCode::Char(' '));
        assert!(app.is_playing);

        for _ in 0..app.timeline.len() {
            app.tick_playback();
        }
        assert!(!app.is_playing);
        assert_eq!(app.status_message, "Playback complete");
        assert!(app.timeline.is_at_end());
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_render_shows_current_line() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content.iter().map(|cell| cell.symbol()).collect();
        assert!(screen.contains("return b;"));
        assert!(screen.contains("Context"));
        assert!(screen.contains("END"));
        assert!(screen.contains("▶   4"));
    }
}
