//! DisplayNode materialization and widget chrome.
//!
//! The transcript is laid out bottom-up: each entry gets its own rect sized
//! by its content, so text flows as paragraphs while tables, maps, and
//! charts draw with their native widgets. Hit-test rects for the launcher,
//! the header, and the overlay chart are refreshed on every draw.

use confab::config::ThemeColor;
use confab::display::{ChartBlock, DisplayNode, Grid, PreparedPlot, TraceKind};
use confab::render::chart::{COMPACT_HEIGHT, COMPACT_WIDTH};
use confab::render::rag::RAG_MARKER;
use confab::session::WidgetSession;
use confab::state::WidgetVisibility;
use confab::transcript::{Origin, TranscriptEntry};
use ratatui::prelude::*;
use ratatui::widgets::canvas::{Canvas, Map as WorldMap, MapResolution, Points};
use ratatui::widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Row, Table, Wrap};

use crate::app::{App, InputMode};

/// Chat window width, in cells.
const WIDGET_WIDTH: u16 = 46;
/// Canvas height for location maps.
const MAP_HEIGHT: u16 = 8;

fn theme(color: ThemeColor) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

// ── Root ──────────────────────────────────────────────────────────────

pub(crate) fn render(frame: &mut Frame, session: &WidgetSession, app: &mut App) {
    let area = frame.area();
    app.frame_area = area;

    let (log_area, main) = if app.show_logs && area.height > 14 {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(6)])
            .split(area);
        (Some(chunks[0]), chunks[1])
    } else {
        (None, area)
    };

    render_backdrop(frame, main, session);
    render_launcher(frame, main, session, app);
    if session.ui.is_shown() {
        render_widget_window(frame, main, session, app);
    } else {
        app.header_rect = Rect::default();
    }
    if let Some(log_area) = log_area {
        render_logs(frame, log_area, app);
    }
    render_overlay(frame, session, app);
}

// ── Host backdrop ─────────────────────────────────────────────────────

fn render_backdrop(frame: &mut Frame, area: Rect, session: &WidgetSession) {
    let dim = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::raw(""),
        Line::styled(format!("socket: {:?}", session.connection_state()), dim),
    ];
    if !session.ui.is_shown() {
        lines.push(Line::styled(
            "click the launcher or press ^T to chat",
            dim,
        ));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(dim)
        .title(" host application ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ── Launcher ──────────────────────────────────────────────────────────

fn render_launcher(frame: &mut Frame, area: Rect, session: &WidgetSession, app: &mut App) {
    if area.width < 10 || area.height < 4 {
        app.launcher_rect = Rect::default();
        return;
    }
    let rect = Rect::new(
        area.right().saturating_sub(8),
        area.bottom().saturating_sub(4),
        6,
        3,
    );
    app.launcher_rect = rect;

    let color = theme(session.config().theme_color);
    let mut icon_style = Style::default().fg(color).add_modifier(Modifier::BOLD);
    if session.ui.launcher_attention() {
        icon_style = icon_style.add_modifier(Modifier::REVERSED);
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let icon = Paragraph::new(Line::styled(session.config().icon.clone(), icon_style))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(Clear, rect);
    frame.render_widget(icon, rect);
}

// ── Chat window ───────────────────────────────────────────────────────

fn render_widget_window(frame: &mut Frame, area: Rect, session: &WidgetSession, app: &mut App) {
    let width = WIDGET_WIDTH.min(area.width.saturating_sub(2));
    let height = area.height.saturating_sub(5);
    if width < 20 || height < 8 {
        return;
    }
    let window = Rect::new(
        area.right().saturating_sub(width + 1),
        area.y + 1,
        width,
        height,
    );

    let color = theme(session.config().theme_color);
    // Fade-out: the closing window renders dimmed until the delay elapses.
    let closing = session.ui.visibility() == WidgetVisibility::Closing;
    let accent = if closing { Color::DarkGray } else { color };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(window);

    frame.render_widget(Clear, window);
    render_header(frame, chunks[0], session, accent);
    app.header_rect = chunks[0];
    render_transcript(frame, chunks[1], session, app, accent);
    render_input_bar(frame, chunks[2], session, app, accent);
}

fn render_header(frame: &mut Frame, area: Rect, session: &WidgetSession, accent: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));
    let title = Paragraph::new(Line::styled(
        session.config().agent_name.clone(),
        Style::default()
            .fg(Color::White)
            .bg(accent)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(title, area);
}

// ── Transcript ────────────────────────────────────────────────────────

fn render_transcript(
    frame: &mut Frame,
    area: Rect,
    session: &WidgetSession,
    app: &mut App,
    accent: Color,
) {
    let block = Block::default()
        .borders(Borders::LEFT | Borders::RIGHT)
        .border_style(Style::default().fg(accent));
    let mut inner = block.inner(area);
    frame.render_widget(block, area);

    if session.ui.awaiting_reply() && inner.height > 1 {
        let cfg = session.config();
        let indicator = Rect::new(inner.x, inner.bottom() - 1, inner.width, 1);
        frame.render_widget(
            Paragraph::new(Line::styled(
                format!("{} is typing {}", cfg.agent_name, cfg.typing_indicator),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )),
            indicator,
        );
        inner.height -= 1;
    }

    // Bottom-up layout: newest entries first, stop when the pane is full.
    // The newest entry is clipped rather than skipped so an oversized
    // message can never blank the pane.
    let mut bottom = inner.bottom();
    let mut slots: Vec<(Rect, &TranscriptEntry)> = Vec::new();
    for entry in session.transcript.entries().iter().rev().skip(app.scroll) {
        let available = bottom.saturating_sub(inner.top());
        if available == 0 {
            break;
        }
        let mut height = entry_height(entry, inner.width, session, app);
        if height > available {
            if !slots.is_empty() {
                break;
            }
            height = available;
        }
        bottom -= height;
        slots.push((Rect::new(inner.x, bottom, inner.width, height), entry));
    }
    for (rect, entry) in slots {
        render_entry(frame, rect, entry, session, app);
    }
}

/// Rows an entry occupies at the given width, label line included.
fn entry_height(entry: &TranscriptEntry, width: u16, session: &WidgetSession, app: &App) -> u16 {
    match &entry.node {
        DisplayNode::Table(grid) => 2 + grid.rows.len() as u16,
        DisplayNode::Map(_) => 2 + MAP_HEIGHT,
        DisplayNode::Chart(_) => 2 + COMPACT_HEIGHT,
        _ => {
            let lines = body_lines(entry, session, app);
            1 + lines
                .iter()
                .map(|line| wrapped_height(&line_text(line), width))
                .sum::<u16>()
        }
    }
}

fn line_text(line: &Line) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

/// Rows a string occupies when wrapped at `width`.
fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = text
        .split('\n')
        .map(|l| l.chars().count().max(1).div_ceil(width))
        .sum();
    rows.max(1) as u16
}

fn render_entry(
    frame: &mut Frame,
    rect: Rect,
    entry: &TranscriptEntry,
    session: &WidgetSession,
    app: &App,
) {
    let cfg = session.config();
    let color = theme(cfg.theme_color);
    let (name, name_color) = match entry.origin {
        Origin::User => (cfg.user_name.as_str(), Color::Cyan),
        Origin::Agent => (cfg.agent_name.as_str(), color),
    };
    let label = Rect::new(rect.x, rect.y, rect.width, 1);
    frame.render_widget(
        Paragraph::new(Line::styled(
            name,
            Style::default().fg(name_color).add_modifier(Modifier::BOLD),
        )),
        label,
    );

    let body = Rect::new(rect.x, rect.y + 1, rect.width, rect.height.saturating_sub(1));
    match &entry.node {
        DisplayNode::Table(grid) => render_table(frame, body, grid, color),
        DisplayNode::Map(point) => render_map(frame, body, point, color),
        DisplayNode::Chart(block) => render_compact_chart(frame, body, block, color),
        _ => {
            let lines = body_lines(entry, session, app);
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body);
        }
    }
}

/// Text content of the line-based nodes. Widget-based nodes (table, map,
/// chart) have no line form and render with their own widgets.
fn body_lines(entry: &TranscriptEntry, session: &WidgetSession, app: &App) -> Vec<Line<'static>> {
    let cfg = session.config();
    let color = theme(cfg.theme_color);
    let button = Style::default().fg(Color::Black).bg(color);

    match &entry.node {
        DisplayNode::Text(text) => text
            .split('\n')
            .map(|l| Line::raw(l.to_string()))
            .collect(),
        DisplayNode::RawHtml(markup) => markup
            .split('\n')
            .map(|l| Line::styled(l.to_string(), Style::default().fg(Color::Gray)))
            .collect(),
        DisplayNode::Rich(rich) => rich.iter().map(rich_line).collect(),
        DisplayNode::Image(image) => vec![Line::styled(
            format!("[JPEG image, {} KB]", image.bytes.len().div_ceil(1024)),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )],
        DisplayNode::File(file) => vec![Line::styled(
            format!(" \u{2913} Download {} ({} KB) ", file.name, file.size.div_ceil(1024)),
            button,
        )],
        DisplayNode::Options(buttons) => {
            let selecting = matches!(app.input_mode, InputMode::OptionSelect)
                && app.options_seen == Some(entry.id);
            buttons
                .iter()
                .enumerate()
                .map(|(i, b)| {
                    let mut style = button;
                    if selecting && i == app.option_cursor {
                        style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
                    }
                    Line::from(Span::styled(format!(" {} ", b.label), style))
                })
                .collect()
        }
        DisplayNode::Rag(block) => {
            let mut lines: Vec<Line<'static>> = format!("{RAG_MARKER} {}", block.answer)
                .split('\n')
                .map(|l| Line::raw(l.to_string()))
                .collect();
            let expanded = session.ui.details_expanded(entry.id);
            let toggle = if expanded { "[Hide Details]" } else { "[Details]" };
            lines.push(Line::styled(
                format!("{toggle} ^D"),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ));
            if expanded {
                let dim = Style::default().fg(Color::DarkGray);
                lines.push(Line::styled(
                    format!("Answer generated by LLM: {}", block.llm_name),
                    dim,
                ));
                lines.push(Line::styled("Input documents:", dim));
                let total = block.docs.len();
                for (i, doc) in block.docs.iter().enumerate() {
                    lines.push(Line::styled(
                        format!("Document {}/{total}", i + 1),
                        Style::default().add_modifier(Modifier::BOLD),
                    ));
                    lines.push(Line::styled(format!("  Source: {}", doc.source), dim));
                    lines.push(Line::styled(format!("  Page: {}", doc.page), dim));
                    for content_line in doc.content.split('\n') {
                        lines.push(Line::raw(format!("  {content_line}")));
                    }
                }
            }
            lines
        }
        // Widget-based nodes handled by the caller.
        DisplayNode::Table(_) | DisplayNode::Map(_) | DisplayNode::Chart(_) => Vec::new(),
    }
}

fn rich_line(line: &confab::display::RichLine) -> Line<'static> {
    let spans = line
        .spans
        .iter()
        .map(|s| {
            let mut style = Style::default();
            if s.bold {
                style = style.add_modifier(Modifier::BOLD);
            }
            if s.italic {
                style = style.add_modifier(Modifier::ITALIC);
            }
            if s.code {
                style = style.fg(Color::Yellow);
            }
            Span::styled(s.text.clone(), style)
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

// ── Structured nodes ──────────────────────────────────────────────────

fn render_table(frame: &mut Frame, area: Rect, grid: &Grid, accent: Color) {
    let header = Row::new(grid.columns.iter().map(String::as_str)).style(
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    );
    let rows = grid
        .rows
        .iter()
        .map(|row| Row::new(row.iter().map(String::as_str)));
    let widths = vec![Constraint::Fill(1); grid.columns.len().max(1)];
    frame.render_widget(Table::new(rows, widths).header(header), area);
}

fn render_map(frame: &mut Frame, area: Rect, point: &confab::display::GeoPoint, accent: Color) {
    if area.height < 2 {
        return;
    }
    let canvas_area = Rect::new(area.x, area.y, area.width, area.height - 1);
    let popup_area = Rect::new(area.x, area.bottom() - 1, area.width, 1);

    let (lat, lon) = (point.latitude, point.longitude);
    let canvas = Canvas::default()
        .x_bounds(point.x_bounds())
        .y_bounds(point.y_bounds())
        .paint(move |ctx| {
            ctx.draw(&WorldMap {
                resolution: MapResolution::High,
                color: Color::DarkGray,
            });
            ctx.draw(&Points {
                coords: &[(lon, lat)],
                color: accent,
            });
        });
    frame.render_widget(canvas, canvas_area);
    frame.render_widget(
        Paragraph::new(Line::styled(
            point.popup(),
            Style::default().fg(accent),
        )),
        popup_area,
    );
}

fn render_compact_chart(frame: &mut Frame, area: Rect, block: &ChartBlock, accent: Color) {
    if area.height < 2 {
        return;
    }
    let chart_width = COMPACT_WIDTH.min(area.width);
    let chart_area = Rect::new(area.x, area.y, chart_width, area.height - 1);
    let affordance_area = Rect::new(area.x, area.bottom() - 1, area.width, 1);

    let plot = block.prepare(chart_area.width, chart_area.height);
    let frame_block = block.title.as_ref().map(|title| {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {title} "))
    });
    frame.render_widget(
        chart_widget(&plot, frame_block, block.x_labels.as_deref(), accent),
        chart_area,
    );
    frame.render_widget(
        Paragraph::new(Line::styled(
            " View Full Screen ^F ",
            Style::default().fg(Color::Black).bg(accent),
        )),
        affordance_area,
    );
}

fn chart_widget<'a>(
    plot: &'a PreparedPlot,
    block: Option<Block<'a>>,
    x_labels: Option<&'a [String]>,
    accent: Color,
) -> Chart<'a> {
    let palette = [accent, Color::Cyan, Color::Yellow, Color::Magenta, Color::Green];
    let datasets = plot
        .datasets
        .iter()
        .enumerate()
        .map(|(i, trace)| {
            let mut dataset = Dataset::default()
                .marker(ratatui::symbols::Marker::Braille)
                .graph_type(match trace.kind {
                    TraceKind::Line => GraphType::Line,
                    TraceKind::Scatter => GraphType::Scatter,
                    TraceKind::Bar => GraphType::Bar,
                })
                .style(Style::default().fg(palette[i % palette.len()]))
                .data(&trace.points);
            if let Some(name) = &trace.name {
                dataset = dataset.name(name.clone());
            }
            dataset
        })
        .collect::<Vec<_>>();

    let x_axis_labels: Vec<String> = match x_labels {
        Some(labels) if !labels.is_empty() => {
            let mut ends = vec![labels[0].clone()];
            if labels.len() > 1 {
                ends.push(labels[labels.len() - 1].clone());
            }
            ends
        }
        _ => vec![axis_label(plot.x_bounds[0]), axis_label(plot.x_bounds[1])],
    };
    let y_axis_labels = vec![axis_label(plot.y_bounds[0]), axis_label(plot.y_bounds[1])];

    let axis_style = Style::default().fg(Color::DarkGray);
    let mut chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .bounds(plot.x_bounds)
                .labels(x_axis_labels)
                .style(axis_style),
        )
        .y_axis(
            Axis::default()
                .bounds(plot.y_bounds)
                .labels(y_axis_labels)
                .style(axis_style),
        );
    if let Some(block) = block {
        chart = chart.block(block);
    }
    chart
}

fn axis_label(bound: f64) -> String {
    format!("{bound:.1}")
}

// ── Fullscreen overlay ────────────────────────────────────────────────

fn render_overlay(frame: &mut Frame, session: &WidgetSession, app: &mut App) {
    let Some(overlay) = session.ui.fullscreen() else {
        app.overlay_chart_rect = None;
        return;
    };
    let area = frame.area();
    let width = overlay.plot.width.min(area.width);
    let height = overlay.plot.height.min(area.height);
    let rect = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );
    app.overlay_chart_rect = Some(rect);

    let chart_block = session.transcript.get(overlay.entry).and_then(|e| {
        if let DisplayNode::Chart(block) = &e.node {
            Some(block)
        } else {
            None
        }
    });
    let title = chart_block
        .and_then(|b| b.title.clone())
        .unwrap_or_else(|| "Chart".into());
    let accent = theme(session.config().theme_color);
    let border = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .title(format!(" {title} "))
        .title_bottom(" [Esc] or click outside to close ");

    frame.render_widget(Clear, rect);
    frame.render_widget(
        chart_widget(
            &overlay.plot,
            Some(border),
            chart_block.and_then(|b| b.x_labels.as_deref()),
            accent,
        ),
        rect,
    );
}

// ── Input bar ─────────────────────────────────────────────────────────

fn render_input_bar(
    frame: &mut Frame,
    area: Rect,
    session: &WidgetSession,
    app: &App,
    accent: Color,
) {
    let (title, style) = match app.input_mode {
        InputMode::Typing => {
            let hint = app
                .status_message
                .clone()
                .unwrap_or_else(|| "[Enter] send  [^T] hide  [^R] reset".to_string());
            (format!(" {hint} "), Style::default().fg(Color::DarkGray))
        }
        InputMode::OptionSelect => (
            " [Up/Down] choose  [Enter] send  [Esc] type instead ".to_string(),
            Style::default().fg(Color::Yellow),
        ),
    };

    let content = if app.input_buffer.is_empty() {
        Line::styled(
            session.config().input_placeholder.clone(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Line::raw(format!("{}\u{2588}", app.input_buffer))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .title(Line::styled(title, style));
    frame.render_widget(Paragraph::new(content).block(block), area);
}

// ── Log pane ──────────────────────────────────────────────────────────

fn level_style(level: tracing::Level) -> Style {
    match level {
        tracing::Level::ERROR => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        tracing::Level::WARN => Style::default().fg(Color::Yellow),
        tracing::Level::INFO => Style::default().fg(Color::Green),
        tracing::Level::DEBUG => Style::default().fg(Color::Cyan),
        _ => Style::default().fg(Color::DarkGray),
    }
}

fn render_logs(frame: &mut Frame, area: Rect, app: &App) {
    let inner_height = usize::from(area.height.saturating_sub(2));
    let lines: Vec<Line> = app
        .log_lines
        .iter()
        .rev()
        .take(inner_height)
        .rev()
        .map(|log| {
            Line::from(vec![
                Span::styled(format!("{} ", log.time), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{:5} ", log.level), level_style(log.level)),
                Span::raw(log.message.clone()),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Log ");
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
