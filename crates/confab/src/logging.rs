//! Tracing capture for the in-widget log pane.
//!
//! The frontend owns the terminal while the widget runs, so diagnostics
//! cannot go to stderr. This layer captures log events into a shared buffer
//! the frontend drains once per frame. The buffer has its own lock and a
//! hard cap, so bursty logging neither blocks the render loop nor grows
//! without bound.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::Local;
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Captured lines kept before the oldest are discarded.
pub const MAX_CAPTURED_LINES: usize = 500;

/// One captured log line.
#[derive(Clone, Debug)]
pub struct LogLine {
    pub time: String,
    pub level: Level,
    pub message: String,
}

/// Shared buffer of captured lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<VecDeque<LogLine>>>);

impl LogBuffer {
    /// Take all pending lines. Called by the frontend once per frame.
    pub fn drain(&self) -> Vec<LogLine> {
        let mut buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
        buf.drain(..).collect()
    }

    fn push(&self, line: LogLine) {
        let mut buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
        if buf.len() == MAX_CAPTURED_LINES {
            buf.pop_front();
        }
        buf.push_back(line);
    }
}

/// A `tracing_subscriber` layer feeding a [`LogBuffer`].
pub struct CaptureLayer {
    buffer: LogBuffer,
}

impl CaptureLayer {
    /// Create the layer and the buffer the frontend drains.
    pub fn new() -> (Self, LogBuffer) {
        let buffer = LogBuffer::default();
        (
            Self {
                buffer: buffer.clone(),
            },
            buffer,
        )
    }
}

impl<S: Subscriber + for<'a> LookupSpan<'a>> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        self.buffer.push(LogLine {
            time: Local::now().format("%H:%M:%S").to_string(),
            level: *event.metadata().level(),
            message: visitor.into_message(),
        });
    }
}

/// Collects the `message` field plus any extra fields as `key=value`.
#[derive(Default)]
struct LineVisitor {
    message: String,
    extras: String,
}

impl LineVisitor {
    fn into_message(self) -> String {
        if self.message.is_empty() {
            self.extras.trim_start().to_string()
        } else if self.extras.is_empty() {
            self.message
        } else {
            format!("{}{}", self.message, self.extras)
        }
    }
}

impl tracing::field::Visit for LineVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.extras.push_str(&format!(" {}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
            // Debug-formatting a plain string message wraps it in quotes.
            if self.message.len() >= 2
                && self.message.starts_with('"')
                && self.message.ends_with('"')
            {
                self.message = self.message.trim_matches('"').to_string();
            }
        } else {
            self.extras
                .push_str(&format!(" {}={:?}", field.name(), value));
        }
    }
}
