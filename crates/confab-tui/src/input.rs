//! Key and mouse routing for the host terminal.

use std::time::Instant;

use confab::display::DisplayNode;
use confab::session::WidgetSession;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::app::{App, InputMode};

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App, session: &mut WidgetSession) {
    let now = Instant::now();

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('t') => session.ui.toggle(now),
            KeyCode::Char('l') => app.show_logs = !app.show_logs,
            KeyCode::Char('r') => {
                session.reset();
                app.scroll = 0;
                app.options_seen = None;
                app.input_mode = InputMode::Typing;
                app.status_message = Some("Session reset.".into());
            }
            KeyCode::Char('d') => toggle_rag_details(app, session),
            KeyCode::Char('f') => open_chart_fullscreen(app, session),
            KeyCode::Char('p') => enter_option_select(app, session),
            _ => {}
        }
        return;
    }

    // The overlay swallows Esc before any mode handling.
    if session.ui.fullscreen().is_some() && key.code == KeyCode::Esc {
        session.ui.close_fullscreen();
        return;
    }

    match app.input_mode {
        InputMode::Typing => handle_typing_key(key, app, session),
        InputMode::OptionSelect => handle_option_select_key(key, app, session),
    }
}

fn handle_typing_key(key: KeyEvent, app: &mut App, session: &mut WidgetSession) {
    // While the widget is hidden only the global shortcuts apply.
    if !session.ui.is_shown() {
        return;
    }
    match key.code {
        KeyCode::Enter => {
            if session.send_user_message(&app.input_buffer).is_some() {
                app.input_buffer.clear();
                app.scroll = 0;
                app.status_message = None;
            }
        }
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => app.input_buffer.push(c),
        KeyCode::Up => app.scroll = app.scroll.saturating_add(1),
        KeyCode::Down => app.scroll = app.scroll.saturating_sub(1),
        KeyCode::PageUp => app.scroll = app.scroll.saturating_add(5),
        KeyCode::PageDown => app.scroll = app.scroll.saturating_sub(5),
        KeyCode::End => app.scroll = 0,
        KeyCode::Esc => app.input_buffer.clear(),
        _ => {}
    }
}

fn handle_option_select_key(key: KeyEvent, app: &mut App, session: &mut WidgetSession) {
    let button_count = app
        .options_seen
        .and_then(|id| session.transcript.get(id))
        .map_or(0, |entry| match &entry.node {
            DisplayNode::Options(buttons) => buttons.len(),
            _ => 0,
        });
    if button_count == 0 {
        app.input_mode = InputMode::Typing;
        return;
    }

    match key.code {
        KeyCode::Up => app.option_cursor = app.option_cursor.saturating_sub(1),
        KeyCode::Down => {
            if app.option_cursor + 1 < button_count {
                app.option_cursor += 1;
            }
        }
        KeyCode::Enter => {
            let label = app
                .options_seen
                .and_then(|id| session.transcript.get(id))
                .and_then(|entry| match &entry.node {
                    DisplayNode::Options(buttons) => {
                        buttons.get(app.option_cursor).map(|b| b.label.clone())
                    }
                    _ => None,
                });
            if let Some(label) = label {
                // Selecting a button is exactly typing its label and sending.
                session.select_option(&label);
                app.scroll = 0;
            }
            app.input_mode = InputMode::Typing;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Typing;
            app.status_message = Some("Pick an option later with ^P.".into());
        }
        _ => {}
    }
}

pub(crate) fn handle_mouse_event(event: MouseEvent, app: &mut App, session: &mut WidgetSession) {
    let MouseEventKind::Down(MouseButton::Left) = event.kind else {
        return;
    };
    let now = Instant::now();
    let pos = Position::new(event.column, event.row);

    // Overlay first: a click anywhere outside the chart area closes it.
    if session.ui.fullscreen().is_some() {
        let inside = app.overlay_chart_rect.is_some_and(|rect| rect.contains(pos));
        if !inside {
            session.ui.close_fullscreen();
        }
        return;
    }

    if app.launcher_rect.contains(pos) {
        session.ui.launcher_clicked(now);
    } else if session.ui.is_shown() && app.header_rect.contains(pos) {
        session.ui.toggle(now);
    }
}

/// Toggle the details panel of the most recent RAG answer.
fn toggle_rag_details(app: &mut App, session: &mut WidgetSession) {
    let Some(id) = session.transcript.last_rag().map(|entry| entry.id) else {
        app.status_message = Some("No answer with details.".into());
        return;
    };
    session.ui.toggle_details(id);
}

/// Open the fullscreen overlay for the most recent chart, re-plotted at 90%
/// of the current viewport.
fn open_chart_fullscreen(app: &mut App, session: &mut WidgetSession) {
    let Some(entry) = session.transcript.last_chart() else {
        app.status_message = Some("No chart to expand.".into());
        return;
    };
    let DisplayNode::Chart(block) = &entry.node else {
        return;
    };
    let id = entry.id;
    let (width, height) = confab::display::ChartBlock::fullscreen_dims(
        app.frame_area.width,
        app.frame_area.height,
    );
    let plot = block.prepare(width, height);
    session.ui.open_fullscreen(id, plot);
}

/// Re-enter option selection for the most recent options message.
fn enter_option_select(app: &mut App, session: &mut WidgetSession) {
    let Some(id) = session.transcript.last_options().map(|entry| entry.id) else {
        app.status_message = Some("No options offered.".into());
        return;
    };
    app.options_seen = Some(id);
    app.option_cursor = 0;
    app.input_mode = InputMode::OptionSelect;
}

/// Auto-enter option selection when a new options message arrives.
pub(crate) fn auto_enter_option_select(app: &mut App, session: &WidgetSession) {
    if let Some(entry) = session.transcript.last_options()
        && app.options_seen != Some(entry.id)
    {
        app.options_seen = Some(entry.id);
        app.option_cursor = 0;
        app.input_mode = InputMode::OptionSelect;
    }
}
