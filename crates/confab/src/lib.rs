//! confab: embeddable chat widget core for websocket agent platforms.
//!
//! A widget session owns a socket to a remote conversational agent,
//! decodes typed JSON payloads, renders each action kind with a dedicated
//! renderer into a framework-agnostic display tree, and exposes the
//! connection and visibility state machines a frontend drives. The
//! `confab-tui` crate is the terminal frontend.
//!
//! # Architecture
//!
//! ```text
//! socket ──▶ ConnectionManager ──decode──▶ ConnectionEvent channel
//!                                              │ (frontend loop, serial)
//!                                              ▼
//!               ActionRegistry ◀─resolve── Dispatcher ──append──▶ Transcript
//!                     │                                               │
//!                     ▼                                               ▼
//!                 Renderers ──▶ DisplayNode                    frontend draw
//! ```
//!
//! # Quick start
//!
//! ```ignore
//! use confab::{WidgetConfig, WidgetSession};
//!
//! let (mut session, mut events) = WidgetSession::connect(WidgetConfig::default());
//! while let Some(event) = events.recv().await {
//!     session.handle_event(event);
//! }
//! ```

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod registry;
pub mod render;
pub mod session;
pub mod state;
pub mod transcript;

pub use config::{ThemeColor, WidgetConfig};
pub use connection::{ConnectionEvent, ConnectionManager, ConnectionState};
pub use dispatch::{Dispatcher, DropReason};
pub use display::DisplayNode;
pub use error::{ConnectionError, MalformedBody, ProtocolError};
pub use logging::{CaptureLayer, LogBuffer, LogLine};
pub use protocol::{ActionKind, Payload};
pub use registry::{ActionRegistry, RegistryVariant, RendererSpec};
pub use session::WidgetSession;
pub use state::{ChartOverlay, UiStateController, WidgetVisibility};
pub use transcript::{EntryId, Origin, Transcript, TranscriptEntry};
