//! Failure taxonomy for the widget.
//!
//! Every failure here is local and non-fatal: a bad frame is logged and
//! dropped, a misuse of the connection surfaces as an `Err` to the caller,
//! and nothing ever panics the event loop or leaves a state machine
//! half-transitioned. The end user never sees an error banner; a failing
//! message is simply absent from the transcript.

use thiserror::Error;

use crate::connection::ConnectionState;

/// Transport-level failures from the socket connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// `send` was called while the socket was not open. Outbound frames are
    /// never queued, so this is a caller error, not a deferred delivery.
    #[error("socket is {0:?}, not open")]
    NotOpen(ConnectionState),
    /// The underlying transport failed to open or dropped mid-session.
    /// Terminal for the connection instance; a fresh `open` is required.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Inbound frame decode failures. The frame is dropped; the connection
/// state is unaffected.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame was not valid JSON.
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The frame was valid JSON but its action tag is not a known wire kind.
    #[error("unknown action kind `{0}`")]
    UnknownAction(String),
}

/// A renderer rejected a recognized kind because the body shape is invalid
/// (e.g. a dataframe JSON missing a row index). Validated before any
/// transcript mutation, so a malformed body is a clean drop.
#[derive(Debug, Error)]
#[error("malformed {kind} body: {detail}")]
pub struct MalformedBody {
    /// Wire name of the action kind whose body failed validation.
    pub kind: &'static str,
    pub detail: String,
}

impl MalformedBody {
    pub fn new(kind: &'static str, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_body_displays_kind_and_detail() {
        let err = MalformedBody::new("dataframe", "not an object");
        assert_eq!(err.to_string(), "malformed dataframe body: not an object");
    }

    #[test]
    fn not_open_names_the_state() {
        let err = ConnectionError::NotOpen(ConnectionState::Connecting);
        assert!(err.to_string().contains("Connecting"));
    }
}
