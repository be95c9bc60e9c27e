//! TUI-local state (not shared with the widget session).

use confab::logging::LogLine;
use confab::transcript::EntryId;
use ratatui::layout::Rect;

/// Input mode for the host terminal.
pub(crate) enum InputMode {
    /// Keystrokes go to the message input; Enter submits.
    Typing,
    /// Option-button selection; arrow keys navigate, Enter sends the
    /// highlighted label, Esc returns to typing.
    OptionSelect,
}

/// TUI-local state.
pub(crate) struct App {
    pub(crate) input_mode: InputMode,
    pub(crate) input_buffer: String,
    /// Entries scrolled up from the transcript tail (0 = follow tail).
    pub(crate) scroll: usize,
    /// Highlighted button index in option-select mode.
    pub(crate) option_cursor: usize,
    /// Options entry the select mode was last auto-entered for, so a new
    /// options message re-arms the mode exactly once.
    pub(crate) options_seen: Option<EntryId>,
    /// Whether the log pane is visible (toggled with Ctrl-L).
    pub(crate) show_logs: bool,
    pub(crate) log_lines: Vec<LogLine>,
    /// Status hint shown in the input bar title.
    pub(crate) status_message: Option<String>,
    pub(crate) should_quit: bool,

    // Hit-test rects, refreshed on every draw.
    pub(crate) launcher_rect: Rect,
    pub(crate) header_rect: Rect,
    /// The chart area inside the fullscreen overlay; a click outside it
    /// closes the overlay.
    pub(crate) overlay_chart_rect: Option<Rect>,
    /// Last drawn frame area, used to size fullscreen re-plots.
    pub(crate) frame_area: Rect,
}

/// Log lines kept for the pane.
pub(crate) const MAX_LOG_LINES: usize = 300;

impl App {
    pub(crate) fn new() -> Self {
        Self {
            input_mode: InputMode::Typing,
            input_buffer: String::new(),
            scroll: 0,
            option_cursor: 0,
            options_seen: None,
            show_logs: false,
            log_lines: Vec::new(),
            status_message: None,
            should_quit: false,
            launcher_rect: Rect::default(),
            header_rect: Rect::default(),
            overlay_chart_rect: None,
            frame_area: Rect::default(),
        }
    }

    pub(crate) fn push_logs(&mut self, lines: Vec<LogLine>) {
        self.log_lines.extend(lines);
        if self.log_lines.len() > MAX_LOG_LINES {
            let drain = self.log_lines.len() - MAX_LOG_LINES;
            self.log_lines.drain(..drain);
        }
    }
}
