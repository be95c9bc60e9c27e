//! Renderers: pure transformations from a message body to a display node.
//!
//! One renderer per action kind, all with the same shape:
//! `fn(body, theme) -> Result<DisplayNode, MalformedBody>`. Renderers never
//! panic on any input: a body that does not match the kind's expected shape
//! is a [`MalformedBody`] and the dispatcher drops the frame. The theme
//! color is threaded to every renderer for uniformity even where a kind has
//! no themed affordance.

pub mod chart;
pub mod location;
pub mod markdown;
pub mod media;
pub mod rag;
pub mod table;

use serde_json::Value;

use crate::config::ThemeColor;
use crate::display::{DisplayNode, OptionButton};
use crate::error::MalformedBody;

/// Uniform renderer signature stored in the registry table.
pub type RenderFn = fn(&Value, &ThemeColor) -> Result<DisplayNode, MalformedBody>;

/// Extract a string body or reject the frame.
pub(crate) fn body_str<'a>(body: &'a Value, kind: &'static str) -> Result<&'a str, MalformedBody> {
    body.as_str()
        .ok_or_else(|| MalformedBody::new(kind, "body is not a string"))
}

/// Stringify a JSON scalar the way a text cell displays it: strings bare,
/// everything else in its JSON form.
pub(crate) fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Literal text node, no markup interpretation.
pub fn text(body: &Value, _theme: &ThemeColor) -> Result<DisplayNode, MalformedBody> {
    Ok(DisplayNode::Text(body_str(body, "text")?.to_string()))
}

/// Raw markup pass-through.
///
/// The body reaches the display unescaped, so a compromised or echoing
/// remote agent can inject arbitrary markup. Sanitization is the upstream
/// agent's responsibility; hosts that do not accept that boundary disable
/// the kind via [`crate::config::WidgetConfig::allow_raw_html`].
pub fn html(body: &Value, _theme: &ThemeColor) -> Result<DisplayNode, MalformedBody> {
    Ok(DisplayNode::RawHtml(body_str(body, "html")?.to_string()))
}

/// Option buttons from a JSON-string body of key → label.
///
/// Entries keep their arrival order. Selecting a button later sends its
/// label verbatim as a user message.
pub fn options(body: &Value, _theme: &ThemeColor) -> Result<DisplayNode, MalformedBody> {
    let raw = body_str(body, "options")?;
    let map: serde_json::Map<String, Value> = serde_json::from_str(raw)
        .map_err(|e| MalformedBody::new("options", format!("body is not a JSON object: {e}")))?;
    let buttons = map
        .iter()
        .map(|(key, label)| OptionButton {
            key: key.clone(),
            label: value_text(label),
        })
        .collect();
    Ok(DisplayNode::Options(buttons))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme() -> ThemeColor {
        ThemeColor::DEFAULT
    }

    #[test]
    fn text_is_literal() {
        let node = text(&Value::String("a <b> & c".into()), &theme()).unwrap();
        assert_eq!(node, DisplayNode::Text("a <b> & c".into()));
    }

    #[test]
    fn text_rejects_non_string() {
        assert!(text(&serde_json::json!(42), &theme()).is_err());
    }

    #[test]
    fn html_passes_markup_through_unescaped() {
        let node = html(&Value::String("<b>bold</b>".into()), &theme()).unwrap();
        assert_eq!(node, DisplayNode::RawHtml("<b>bold</b>".into()));
    }

    #[test]
    fn options_keep_order_and_labels() {
        let body = Value::String(r#"{"1":"Yes","2":"No"}"#.into());
        let DisplayNode::Options(buttons) = options(&body, &theme()).unwrap() else {
            panic!("expected options node");
        };
        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0].key, "1");
        assert_eq!(buttons[0].label, "Yes");
        assert_eq!(buttons[1].label, "No");
    }

    #[test]
    fn options_stringify_non_string_labels() {
        let body = Value::String(r#"{"a":3}"#.into());
        let DisplayNode::Options(buttons) = options(&body, &theme()).unwrap() else {
            panic!("expected options node");
        };
        assert_eq!(buttons[0].label, "3");
    }

    #[test]
    fn options_reject_non_object_body() {
        assert!(options(&Value::String("[1,2]".into()), &theme()).is_err());
        assert!(options(&serde_json::json!({"a": "b"}), &theme()).is_err());
    }
}
