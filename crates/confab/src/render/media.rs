//! Image and file bodies: base64 transfer encodings.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::config::ThemeColor;
use crate::display::{DisplayNode, FileBlock, ImageBlock};
use crate::error::MalformedBody;

use super::body_str;

/// Inline image. The body is the bare base64 string; the platform fixes the
/// MIME to JPEG.
pub fn image(body: &Value, _theme: &ThemeColor) -> Result<DisplayNode, MalformedBody> {
    let b64 = body_str(body, "image")?;
    let bytes = STANDARD
        .decode(b64.trim())
        .map_err(|e| MalformedBody::new("image", format!("invalid base64: {e}")))?;
    Ok(DisplayNode::Image(ImageBlock {
        bytes,
        mime: "image/jpeg",
    }))
}

/// File download affordance from a `{name, type, base64}` body. The href is
/// a data URI so the affordance carries its own payload.
pub fn file(body: &Value, _theme: &ThemeColor) -> Result<DisplayNode, MalformedBody> {
    let obj = body
        .as_object()
        .ok_or_else(|| MalformedBody::new("file", "body is not an object"))?;
    let name = field_str(obj, "name")?;
    let mime = field_str(obj, "type")?;
    let b64 = field_str(obj, "base64")?;
    let size = STANDARD
        .decode(b64.trim())
        .map_err(|e| MalformedBody::new("file", format!("invalid base64: {e}")))?
        .len();
    Ok(DisplayNode::File(FileBlock {
        name: name.to_string(),
        mime: mime.to_string(),
        data_uri: format!("data:{mime};base64,{b64}"),
        size,
    }))
}

fn field_str<'a>(
    obj: &'a serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, MalformedBody> {
    obj.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| MalformedBody::new("file", format!("missing string field `{field}`")))
}
