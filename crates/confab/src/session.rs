//! Per-mount widget session.
//!
//! Everything a mounted widget owns hangs off one `WidgetSession`: the
//! configuration, the dispatcher with its registry, the connection, the
//! transcript, and the UI state controller. Two sessions in one process
//! share nothing; there is no module-level socket or config.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::WidgetConfig;
use crate::connection::{ConnectionEvent, ConnectionManager, ConnectionState};
use crate::dispatch::Dispatcher;
use crate::protocol::Payload;
use crate::registry::ActionRegistry;
use crate::state::UiStateController;
use crate::transcript::{EntryId, Transcript};

pub struct WidgetSession {
    config: WidgetConfig,
    dispatcher: Dispatcher,
    connection: ConnectionManager,
    pub transcript: Transcript,
    pub ui: UiStateController,
}

impl WidgetSession {
    /// Mount a widget: assemble per-instance state and open the socket to
    /// the configured address. Must be called within a tokio runtime.
    pub fn connect(config: WidgetConfig) -> (Self, mpsc::Receiver<ConnectionEvent>) {
        let registry = ActionRegistry::new(config.registry, config.allow_raw_html);
        let dispatcher = Dispatcher::new(registry, config.theme_color);
        let (connection, events) = ConnectionManager::open(&config.ws_address);
        (
            Self {
                config,
                dispatcher,
                connection,
                transcript: Transcript::new(),
                ui: UiStateController::new(),
            },
            events,
        )
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Drive the session from one connection event. Call serially from the
    /// single frontend loop; processing order is delivery order.
    pub fn handle_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Opened => debug!("session connected to {}", self.config.ws_address),
            ConnectionEvent::Inbound(payload) => {
                if self
                    .dispatcher
                    .handle_inbound(&payload, &mut self.transcript)
                    .is_ok()
                {
                    self.ui.set_awaiting_reply(false);
                }
            }
            ConnectionEvent::Closed => debug!("session disconnected"),
            ConnectionEvent::Errored(e) => warn!("session transport error: {e}"),
        }
    }

    /// Send user input: echo locally, then transmit. Whitespace-only input
    /// is a no-op. A send failure is logged; the local echo stands, same as
    /// the reference widget.
    pub fn send_user_message(&mut self, text: &str) -> Option<EntryId> {
        let (id, payload) = self
            .dispatcher
            .handle_outbound(text, &mut self.transcript)?;
        self.ui.set_awaiting_reply(true);
        if let Err(e) = self.connection.send(&payload) {
            warn!("outbound send failed: {e}");
        }
        Some(id)
    }

    /// Select an option button: sends its label exactly as if the user had
    /// typed and submitted it.
    pub fn select_option(&mut self, label: &str) -> Option<EntryId> {
        self.send_user_message(label)
    }

    /// Restart the remote agent session: clear the local history and tell
    /// the server.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.ui.clear_entry_state();
        if let Err(e) = self.connection.send(&Payload::reset()) {
            warn!("reset not sent: {e}");
        }
    }

    /// Unmount: close the socket. Pending deferred work dies with the
    /// session.
    pub fn shutdown(&self) {
        self.connection.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayNode;
    use crate::protocol::ActionKind;
    use crate::transcript::Origin;
    use serde_json::Value;

    // An address nothing listens on: the socket task errors in the
    // background while the session-side logic under test runs unaffected.
    fn offline_session() -> WidgetSession {
        let config = WidgetConfig {
            ws_address: "ws://127.0.0.1:1".into(),
            ..WidgetConfig::default()
        };
        WidgetSession::connect(config).0
    }

    #[tokio::test]
    async fn outbound_echoes_locally_even_when_offline() {
        let mut session = offline_session();
        let id = session.send_user_message("hello").unwrap();
        assert_eq!(session.transcript.len(), 1);
        let entry = session.transcript.get(id).unwrap();
        assert_eq!(entry.origin, Origin::User);
        assert_eq!(entry.node, DisplayNode::Text("hello".into()));
        assert!(session.ui.awaiting_reply());
    }

    #[tokio::test]
    async fn inbound_appends_and_clears_typing() {
        let mut session = offline_session();
        session.ui.set_awaiting_reply(true);
        session.handle_event(ConnectionEvent::Inbound(Payload {
            action: ActionKind::AgentReplyStr,
            message: Some(Value::String("hi".into())),
        }));
        assert_eq!(session.transcript.len(), 1);
        assert!(!session.ui.awaiting_reply());
    }

    #[tokio::test]
    async fn dropped_inbound_keeps_typing_flag() {
        let mut session = offline_session();
        session.ui.set_awaiting_reply(true);
        session.handle_event(ConnectionEvent::Inbound(Payload {
            action: ActionKind::BotReplyStr, // not in the Full registry
            message: Some(Value::String("hi".into())),
        }));
        assert_eq!(session.transcript.len(), 0);
        assert!(session.ui.awaiting_reply());
    }

    #[tokio::test]
    async fn reset_clears_transcript_and_entry_state() {
        let mut session = offline_session();
        session.send_user_message("hello");
        session.ui.toggle_details(0);
        session.reset();
        assert!(session.transcript.is_empty());
        assert!(!session.ui.details_expanded(0));
    }

    #[tokio::test]
    async fn two_sessions_share_nothing() {
        let mut a = offline_session();
        let b = offline_session();
        a.send_user_message("only in a");
        assert_eq!(a.transcript.len(), 1);
        assert_eq!(b.transcript.len(), 0);
    }
}
