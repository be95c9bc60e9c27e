//! Terminal host embedding the confab chat widget.
//!
//! Draws a placeholder host page with the floating launcher, the chat
//! window, and the fullscreen chart overlay on top, and drives the widget
//! session from a single blocking loop: connection events and input events
//! are drained one at a time, so transcript order is exactly delivery
//! order.
//!
//! # Quick start
//!
//! ```ignore
//! use confab::{CaptureLayer, WidgetConfig, WidgetSession};
//! use tracing_subscriber::prelude::*;
//!
//! let (layer, logs) = CaptureLayer::new();
//! tracing_subscriber::registry().with(layer).init();
//! let (session, events) = WidgetSession::connect(WidgetConfig::default());
//! confab_tui::run(session, events, logs).unwrap();
//! ```

use std::io;
use std::time::{Duration, Instant};

use confab::connection::ConnectionEvent;
use confab::logging::LogBuffer;
use confab::session::WidgetSession;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{cursor, execute};
use ratatui::prelude::*;
use tokio::sync::mpsc;

mod app;
mod input;
mod render;

use app::App;
use input::{auto_enter_option_select, handle_key_event, handle_mouse_event};

/// Run the host terminal until the user quits (blocking). Call from a
/// dedicated thread; the socket I/O stays on the tokio runtime.
pub fn run(
    mut session: WidgetSession,
    mut events: mpsc::Receiver<ConnectionEvent>,
    logs: LogBuffer,
) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut app = App::new();

    let result = run_loop(&mut terminal, &mut session, &mut events, &logs, &mut app);

    // Unmount: close the socket before giving the terminal back.
    session.shutdown();
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        cursor::Show
    )?;
    terminal.show_cursor()?;
    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut WidgetSession,
    events: &mut mpsc::Receiver<ConnectionEvent>,
    logs: &LogBuffer,
    app: &mut App,
) -> io::Result<()> {
    loop {
        // Drain pending connection events, one fully-processed payload at a
        // time. No input interleaves within a payload.
        while let Ok(event) = events.try_recv() {
            session.handle_event(event);
        }
        app.push_logs(logs.drain());

        session.ui.tick(Instant::now());
        auto_enter_option_select(app, session);

        terminal.draw(|frame| render::render(frame, session, app))?;

        // Poll for input (100ms timeout keeps animations responsive).
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key_event(key, app, session);
                }
                Event::Mouse(mouse) => handle_mouse_event(mouse, app, session),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
