//! Wire payloads: the closed action-kind enumeration and JSON framing.
//!
//! A frame is `{"action": <kind>, "message": <kind-dependent body>}`. The
//! kind set is closed: adding a kind means adding an enum variant, and the
//! renderer table in [`crate::registry`] will not compile until the new
//! variant has a renderer.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ProtocolError;

/// Discriminant tag on a wire payload, selecting its rendering behavior.
///
/// `AgentReply*` kinds form the reference (full) protocol; `BotReply*` is the
/// reduced legacy naming. `UserMessage` travels outbound and is accepted
/// inbound as an echo convention. `Reset` is an outbound control action that
/// restarts the remote agent session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    UserMessage,
    Reset,
    AgentReplyStr,
    AgentReplyMarkdown,
    AgentReplyHtml,
    AgentReplyImage,
    AgentReplyFile,
    AgentReplyDataframe,
    AgentReplyOptions,
    AgentReplyRag,
    AgentReplyLocation,
    AgentReplyPlotly,
    BotReplyStr,
    BotReplyMarkdown,
    BotReplyHtml,
}

impl ActionKind {
    /// Every wire kind, in protocol order.
    pub const ALL: &'static [ActionKind] = &[
        Self::UserMessage,
        Self::Reset,
        Self::AgentReplyStr,
        Self::AgentReplyMarkdown,
        Self::AgentReplyHtml,
        Self::AgentReplyImage,
        Self::AgentReplyFile,
        Self::AgentReplyDataframe,
        Self::AgentReplyOptions,
        Self::AgentReplyRag,
        Self::AgentReplyLocation,
        Self::AgentReplyPlotly,
        Self::BotReplyStr,
        Self::BotReplyMarkdown,
        Self::BotReplyHtml,
    ];

    /// The tag as it appears on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::UserMessage => "user_message",
            Self::Reset => "reset",
            Self::AgentReplyStr => "agent_reply_str",
            Self::AgentReplyMarkdown => "agent_reply_markdown",
            Self::AgentReplyHtml => "agent_reply_html",
            Self::AgentReplyImage => "agent_reply_image",
            Self::AgentReplyFile => "agent_reply_file",
            Self::AgentReplyDataframe => "agent_reply_dataframe",
            Self::AgentReplyOptions => "agent_reply_options",
            Self::AgentReplyRag => "agent_reply_rag",
            Self::AgentReplyLocation => "agent_reply_location",
            Self::AgentReplyPlotly => "agent_reply_plotly",
            Self::BotReplyStr => "bot_reply_str",
            Self::BotReplyMarkdown => "bot_reply_markdown",
            Self::BotReplyHtml => "bot_reply_html",
        }
    }

    /// Look a wire tag up in the closed set.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.wire_name() == name)
    }
}

/// The wire unit. Transient: constructed, dispatched, discarded, never
/// persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct Payload {
    pub action: ActionKind,
    /// Kind-dependent body. Absent only in error cases and for bodyless
    /// control actions such as [`ActionKind::Reset`].
    pub message: Option<Value>,
}

impl Payload {
    /// An outbound user message.
    pub fn user_message(text: &str) -> Self {
        Self {
            action: ActionKind::UserMessage,
            message: Some(Value::String(text.to_string())),
        }
    }

    /// The bodyless session-restart control payload.
    pub fn reset() -> Self {
        Self {
            action: ActionKind::Reset,
            message: None,
        }
    }

    /// Decode an inbound frame.
    ///
    /// Two-stage so the failure modes stay distinct: invalid JSON is
    /// [`ProtocolError::Json`]; valid JSON with a tag outside the closed
    /// kind set is [`ProtocolError::UnknownAction`].
    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        #[derive(Deserialize)]
        struct RawFrame {
            action: String,
            #[serde(default)]
            message: Option<Value>,
        }

        let frame: RawFrame = serde_json::from_str(raw)?;
        let action = ActionKind::from_wire(&frame.action)
            .ok_or(ProtocolError::UnknownAction(frame.action))?;
        Ok(Self {
            action,
            message: frame.message,
        })
    }

    /// Serialize for transmission. The `message` key is always present,
    /// `null` for bodyless payloads, matching the platform encoder.
    pub fn encode(&self) -> String {
        let frame = serde_json::json!({
            "action": self.action.wire_name(),
            "message": self.message,
        });
        serde_json::to_string(&frame).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for &kind in ActionKind::ALL {
            assert_eq!(ActionKind::from_wire(kind.wire_name()), Some(kind));
        }
    }

    #[test]
    fn decode_reference_kinds() {
        let p = Payload::decode(r#"{"action":"agent_reply_str","message":"hi"}"#).unwrap();
        assert_eq!(p.action, ActionKind::AgentReplyStr);
        assert_eq!(p.message, Some(Value::String("hi".into())));

        let p = Payload::decode(r#"{"action":"bot_reply_markdown","message":"**b**"}"#).unwrap();
        assert_eq!(p.action, ActionKind::BotReplyMarkdown);
    }

    #[test]
    fn decode_structured_body() {
        let p = Payload::decode(
            r#"{"action":"agent_reply_location","message":{"latitude":49.6,"longitude":6.1}}"#,
        )
        .unwrap();
        assert_eq!(p.action, ActionKind::AgentReplyLocation);
        assert!(p.message.unwrap().is_object());
    }

    #[test]
    fn decode_missing_message_is_none() {
        let p = Payload::decode(r#"{"action":"agent_reply_str"}"#).unwrap();
        assert!(p.message.is_none());
    }

    #[test]
    fn invalid_json_is_a_json_error() {
        match Payload::decode("{not json") {
            Err(ProtocolError::Json(_)) => {}
            other => panic!("expected Json error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_is_distinct_from_invalid_json() {
        match Payload::decode(r#"{"action":"agent_dance","message":"x"}"#) {
            Err(ProtocolError::UnknownAction(tag)) => assert_eq!(tag, "agent_dance"),
            other => panic!("expected UnknownAction, got {other:?}"),
        }
    }

    #[test]
    fn user_message_encodes_to_the_documented_frame() {
        let encoded = Payload::user_message("hello").encode();
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["action"], "user_message");
        assert_eq!(value["message"], "hello");
    }

    #[test]
    fn reset_encodes_with_null_message() {
        let value: Value = serde_json::from_str(&Payload::reset().encode()).unwrap();
        assert_eq!(value["action"], "reset");
        assert!(value["message"].is_null());
    }
}
