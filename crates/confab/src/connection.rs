//! Socket ownership: lifecycle, inbound decode, outbound encode.
//!
//! One `ConnectionManager` per widget instance. The socket I/O runs on a
//! background task; decoded payloads and lifecycle transitions reach the
//! widget loop as [`ConnectionEvent`]s over a bounded channel, in exactly
//! the order the transport delivered them.
//!
//! There is no retry: a failed handshake or a dropped transport parks the
//! instance in `Errored`, and only a fresh [`ConnectionManager::open`] call
//! establishes a new connection.

use std::sync::{Arc, Mutex};

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, warn};

use crate::error::ConnectionError;
use crate::protocol::Payload;

/// Transport status, driven solely by socket events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    /// Terminal: no automatic reconnection is ever attempted.
    Errored,
}

/// Lifecycle and traffic events, delivered in transport order.
#[derive(Debug)]
pub enum ConnectionEvent {
    Opened,
    Inbound(Payload),
    Closed,
    Errored(String),
}

enum Outbound {
    Frame(String),
    Shutdown,
}

/// Owns the socket handle for one widget instance.
pub struct ConnectionManager {
    state: Arc<Mutex<ConnectionState>>,
    outbound_tx: mpsc::UnboundedSender<Outbound>,
}

impl ConnectionManager {
    /// Open a socket to `address`.
    ///
    /// Returns immediately; the handshake proceeds on a background task and
    /// reports through the returned event stream. Must be called from
    /// within a tokio runtime.
    pub fn open(address: &str) -> (Self, mpsc::Receiver<ConnectionEvent>) {
        let (event_tx, event_rx) = mpsc::channel(64);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(ConnectionState::Connecting));
        tokio::spawn(run_socket(
            address.to_string(),
            state.clone(),
            event_tx,
            outbound_rx,
        ));
        (
            Self { state, outbound_tx },
            event_rx,
        )
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Serialize a payload and transmit it.
    ///
    /// Legal only while `Open`. There is no send buffering: a send in any
    /// other state is a caller error, surfaced as [`ConnectionError::NotOpen`]
    /// rather than silently queued.
    pub fn send(&self, payload: &Payload) -> Result<(), ConnectionError> {
        let state = self.state();
        if state != ConnectionState::Open {
            return Err(ConnectionError::NotOpen(state));
        }
        self.outbound_tx
            .send(Outbound::Frame(payload.encode()))
            .map_err(|_| ConnectionError::Transport("socket task stopped".into()))
    }

    /// Close the socket and stop the I/O task. Idempotent.
    pub fn close(&self) {
        let _ = self.outbound_tx.send(Outbound::Shutdown);
    }
}

fn set_state(state: &Arc<Mutex<ConnectionState>>, next: ConnectionState) {
    *state.lock().unwrap_or_else(|e| e.into_inner()) = next;
}

/// Socket task: handshake, then pump frames both ways until closure.
async fn run_socket(
    address: String,
    state: Arc<Mutex<ConnectionState>>,
    event_tx: mpsc::Sender<ConnectionEvent>,
    mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
) {
    let ws = match connect_async(address.as_str()).await {
        Ok((ws, _)) => ws,
        Err(e) => {
            error!("socket connect to {address} failed: {e}");
            set_state(&state, ConnectionState::Errored);
            let _ = event_tx.send(ConnectionEvent::Errored(e.to_string())).await;
            return;
        }
    };
    debug!("connected to {address}");
    set_state(&state, ConnectionState::Open);
    if event_tx.send(ConnectionEvent::Opened).await.is_err() {
        return; // widget already unmounted
    }

    let (mut sink, mut stream) = ws.split();
    loop {
        tokio::select! {
            cmd = outbound_rx.recv() => match cmd {
                Some(Outbound::Frame(text)) => {
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        error!("socket send failed: {e}");
                        set_state(&state, ConnectionState::Errored);
                        let _ = event_tx.send(ConnectionEvent::Errored(e.to_string())).await;
                        break;
                    }
                }
                Some(Outbound::Shutdown) | None => {
                    let _ = sink.send(Message::Close(None)).await;
                    set_state(&state, ConnectionState::Closed);
                    let _ = event_tx.send(ConnectionEvent::Closed).await;
                    break;
                }
            },
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    // Decode here so the widget loop only ever sees typed
                    // payloads. A bad frame is dropped without touching the
                    // connection state.
                    match Payload::decode(text.as_str()) {
                        Ok(payload) => {
                            let _ = event_tx.send(ConnectionEvent::Inbound(payload)).await;
                        }
                        Err(e) => warn!("dropping inbound frame: {e}"),
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    set_state(&state, ConnectionState::Closed);
                    let _ = event_tx.send(ConnectionEvent::Closed).await;
                    break;
                }
                Some(Ok(_)) => {} // binary, ping, pong
                Some(Err(e)) => {
                    error!("socket error: {e}");
                    set_state(&state, ConnectionState::Errored);
                    let _ = event_tx.send(ConnectionEvent::Errored(e.to_string())).await;
                    break;
                }
            },
        }
    }
}
