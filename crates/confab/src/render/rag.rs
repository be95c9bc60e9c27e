//! Retrieval-augmented answers: the answer plus its supporting documents.

use serde_json::Value;

use crate::config::ThemeColor;
use crate::display::{DisplayNode, RagBlock, RagDoc};
use crate::error::MalformedBody;

use super::value_text;

/// Marker glyph prefixed to the answer line.
pub const RAG_MARKER: &str = "\u{1f52e}";

pub fn rag(body: &Value, _theme: &ThemeColor) -> Result<DisplayNode, MalformedBody> {
    let obj = body
        .as_object()
        .ok_or_else(|| MalformedBody::new("rag", "body is not an object"))?;

    let answer = str_field(obj, "answer")?;
    let llm_name = str_field(obj, "llm_name")?;
    let question = str_field(obj, "question")?;
    let docs = obj
        .get("docs")
        .and_then(Value::as_array)
        .ok_or_else(|| MalformedBody::new("rag", "missing docs array"))?
        .iter()
        .map(parse_doc)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DisplayNode::Rag(RagBlock {
        answer,
        llm_name,
        question,
        docs,
    }))
}

fn parse_doc(doc: &Value) -> Result<RagDoc, MalformedBody> {
    let obj = doc
        .as_object()
        .ok_or_else(|| MalformedBody::new("rag", "doc is not an object"))?;
    let metadata = obj
        .get("metadata")
        .and_then(Value::as_object)
        .ok_or_else(|| MalformedBody::new("rag", "doc has no metadata"))?;
    let content = obj
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| MalformedBody::new("rag", "doc has no content"))?;
    // Source and page pass through as display text; pages are often numbers.
    let source = metadata.get("source").map(value_text).unwrap_or_default();
    let page = metadata.get("page").map(value_text).unwrap_or_default();
    Ok(RagDoc {
        source,
        page,
        content: content.to_string(),
    })
}

fn str_field(
    obj: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<String, MalformedBody> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| MalformedBody::new("rag", format!("missing string field `{field}`")))
}
