//! Message dispatch between decoded payloads and the transcript.
//!
//! Inbound: resolve the kind, render the body, append tagged `Agent`. Any
//! failure is a drop-with-log; the transcript is never mutated for a frame
//! that does not fully render.
//!
//! Outbound: package the user's text as a `user_message` payload and echo
//! it locally through the text renderer before the caller transmits it.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::config::ThemeColor;
use crate::error::MalformedBody;
use crate::protocol::{ActionKind, Payload};
use crate::registry::ActionRegistry;
use crate::transcript::{EntryId, Origin, Transcript};

/// Why an inbound frame was dropped instead of appended.
#[derive(Debug, Error)]
pub enum DropReason {
    /// The active registry has no renderer for the kind.
    #[error("no renderer for {0:?} in the active registry")]
    NoRenderer(ActionKind),
    /// The payload carried no body.
    #[error("{0:?} payload has no message body")]
    MissingBody(ActionKind),
    /// The body failed the renderer's shape validation.
    #[error(transparent)]
    Malformed(#[from] MalformedBody),
}

pub struct Dispatcher {
    registry: ActionRegistry,
    theme: ThemeColor,
}

impl Dispatcher {
    pub fn new(registry: ActionRegistry, theme: ThemeColor) -> Self {
        Self { registry, theme }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Render an inbound payload into the transcript.
    ///
    /// On failure the frame is dropped with a warning and the transcript is
    /// left exactly as it was: no placeholder entry, no error banner.
    pub fn handle_inbound(
        &self,
        payload: &Payload,
        transcript: &mut Transcript,
    ) -> Result<EntryId, DropReason> {
        let Some(spec) = self.registry.resolve(payload.action) else {
            warn!("dropping frame with unrenderable action {:?}", payload.action);
            return Err(DropReason::NoRenderer(payload.action));
        };
        let Some(body) = payload.message.as_ref() else {
            warn!("dropping bodyless {:?} frame", payload.action);
            return Err(DropReason::MissingBody(payload.action));
        };
        match (spec.render)(body, &self.theme) {
            Ok(node) => Ok(transcript.push(Origin::Agent, spec.class, node)),
            Err(err) => {
                warn!("dropping frame: {err}");
                Err(err.into())
            }
        }
    }

    /// Package user input as a `user_message` payload and echo it locally.
    ///
    /// Empty or whitespace-only input is rejected here and nothing is sent
    /// or displayed. Returns the appended entry id and the payload for the
    /// connection to transmit.
    pub fn handle_outbound(
        &self,
        text: &str,
        transcript: &mut Transcript,
    ) -> Option<(EntryId, Payload)> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let payload = Payload::user_message(text);
        // The local echo goes through the same text renderer the echo-back
        // convention would use, so both paths display identically.
        let spec = self.registry.resolve(ActionKind::UserMessage)?;
        let body = Value::String(text.to_string());
        let node = (spec.render)(&body, &self.theme).ok()?;
        let id = transcript.push(Origin::User, spec.class, node);
        Some((id, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayNode;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(ActionRegistry::full(), ThemeColor::DEFAULT)
    }

    fn inbound(action: &str, message: Value) -> Payload {
        Payload {
            action: ActionKind::from_wire(action).unwrap(),
            message: Some(message),
        }
    }

    #[test]
    fn well_formed_frames_append_agent_entries() {
        let d = dispatcher();
        let mut t = Transcript::new();
        let id = d
            .handle_inbound(&inbound("agent_reply_str", Value::String("hi".into())), &mut t)
            .unwrap();
        let entry = t.get(id).unwrap();
        assert_eq!(entry.origin, Origin::Agent);
        assert_eq!(entry.class, "str-message");
        assert_eq!(entry.node, DisplayNode::Text("hi".into()));
    }

    #[test]
    fn every_supported_kind_renders_a_well_formed_body() {
        let d = dispatcher();
        let mut t = Transcript::new();
        let bodies: Vec<(&str, Value)> = vec![
            ("agent_reply_str", Value::String("text".into())),
            ("agent_reply_markdown", Value::String("**bold**".into())),
            ("agent_reply_html", Value::String("<p>hi</p>".into())),
            ("agent_reply_image", Value::String("aGVsbG8=".into())),
            (
                "agent_reply_file",
                serde_json::json!({"name":"f.txt","type":"text/plain","base64":"aGVsbG8="}),
            ),
            (
                "agent_reply_dataframe",
                Value::String(r#"{"a":{"0":"x"}}"#.into()),
            ),
            (
                "agent_reply_options",
                Value::String(r#"{"1":"Yes"}"#.into()),
            ),
            (
                "agent_reply_rag",
                serde_json::json!({
                    "answer":"a","llm_name":"m","question":"q",
                    "docs":[{"content":"c","metadata":{"source":"s","page":1}}]
                }),
            ),
            (
                "agent_reply_location",
                serde_json::json!({"latitude":1.0,"longitude":2.0}),
            ),
            (
                "agent_reply_plotly",
                Value::String(r#"{"data":[{"x":[1],"y":[2]}]}"#.into()),
            ),
        ];
        for (action, body) in bodies {
            d.handle_inbound(&inbound(action, body), &mut t)
                .unwrap_or_else(|e| panic!("{action} dropped: {e}"));
        }
        assert_eq!(t.len(), 10);
    }

    #[test]
    fn unrenderable_kind_leaves_the_transcript_unchanged() {
        let d = dispatcher();
        let mut t = Transcript::new();
        let err = d
            .handle_inbound(&inbound("bot_reply_str", Value::String("x".into())), &mut t)
            .unwrap_err();
        assert!(matches!(err, DropReason::NoRenderer(_)));
        assert_eq!(t.len(), 0);
    }

    #[test]
    fn bodyless_frame_is_dropped() {
        let d = dispatcher();
        let mut t = Transcript::new();
        let payload = Payload {
            action: ActionKind::AgentReplyStr,
            message: None,
        };
        assert!(matches!(
            d.handle_inbound(&payload, &mut t),
            Err(DropReason::MissingBody(_))
        ));
        assert_eq!(t.len(), 0);
    }

    #[test]
    fn malformed_body_is_dropped() {
        let d = dispatcher();
        let mut t = Transcript::new();
        let err = d
            .handle_inbound(
                &inbound("agent_reply_dataframe", Value::String("broken".into())),
                &mut t,
            )
            .unwrap_err();
        assert!(matches!(err, DropReason::Malformed(_)));
        assert_eq!(t.len(), 0);
    }

    #[test]
    fn outbound_round_trip() {
        let d = dispatcher();
        let mut t = Transcript::new();
        let (id, payload) = d.handle_outbound("hello", &mut t).unwrap();
        assert_eq!(t.len(), 1);
        let entry = t.get(id).unwrap();
        assert_eq!(entry.origin, Origin::User);
        assert_eq!(entry.node, DisplayNode::Text("hello".into()));

        let frame: Value = serde_json::from_str(&payload.encode()).unwrap();
        assert_eq!(frame["action"], "user_message");
        assert_eq!(frame["message"], "hello");
    }

    #[test]
    fn whitespace_only_outbound_is_a_no_op() {
        let d = dispatcher();
        let mut t = Transcript::new();
        assert!(d.handle_outbound("", &mut t).is_none());
        assert!(d.handle_outbound("   \n\t", &mut t).is_none());
        assert_eq!(t.len(), 0);
    }

    #[test]
    fn outbound_trims_surrounding_whitespace() {
        let d = dispatcher();
        let mut t = Transcript::new();
        let (_, payload) = d.handle_outbound("  hi  ", &mut t).unwrap();
        assert_eq!(payload.message, Some(Value::String("hi".into())));
    }

    #[test]
    fn selecting_an_option_sends_its_label() {
        let d = dispatcher();
        let mut t = Transcript::new();
        let id = d
            .handle_inbound(
                &inbound("agent_reply_options", Value::String(r#"{"1":"Yes","2":"No"}"#.into())),
                &mut t,
            )
            .unwrap();
        let DisplayNode::Options(buttons) = &t.get(id).unwrap().node else {
            panic!("expected options node");
        };
        let label = buttons[0].label.clone();

        // Selection is exactly "type the label and submit".
        let (_, payload) = d.handle_outbound(&label, &mut t).unwrap();
        assert_eq!(payload.message, Some(Value::String("Yes".into())));
    }
}
