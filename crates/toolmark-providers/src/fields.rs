use serde::Serialize;
use serde_json::Value;
use serde_json::ser::Formatter;
use std::io;
use toolmark_types::RawDocument;

/// Render a top-level scalar as text: strings verbatim, numbers and
/// booleans in their JSON form, null as empty
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => encode_arguments(other),
    }
}

/// Text of `doc[key]`, or `default` when the key is absent or null
pub(crate) fn text_or(doc: &RawDocument, key: &str, default: &str) -> String {
    match doc.get(key) {
        None | Some(Value::Null) => default.to_string(),
        Some(value) => scalar_text(value),
    }
}

/// Collapse a message `content` value into plain text
///
/// Content-block arrays contribute the text of their text blocks, one per
/// line; non-text blocks are skipped.
pub(crate) fn flatten_content(content: Option<&Value>) -> String {
    match content {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(blocks)) => blocks
            .iter()
            .filter_map(|block| match block {
                Value::String(s) => Some(s.as_str()),
                Value::Object(obj) => {
                    let is_text = obj
                        .get("type")
                        .and_then(Value::as_str)
                        .is_none_or(|t| t == "text");
                    if is_text {
                        obj.get("text").and_then(Value::as_str)
                    } else {
                        None
                    }
                }
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(other) => scalar_text(other),
    }
}

/// Serializer layout with a space after every `,` and `:`
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Encode tool input as the JSON text stored in `function.arguments`
///
/// Keys keep their source order and non-ASCII text is left unescaped,
/// e.g. `{"q": "x", "n": [1, 2]}`.
pub fn encode_arguments(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    // Writing a Value into a Vec cannot fail.
    if value.serialize(&mut ser).is_err() {
        return value.to_string();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_arguments_spacing() {
        assert_eq!(encode_arguments(&json!({"q": "x"})), r#"{"q": "x"}"#);
        assert_eq!(
            encode_arguments(&json!({"a": [1, 2], "b": {"c": null}})),
            r#"{"a": [1, 2], "b": {"c": null}}"#
        );
        assert_eq!(encode_arguments(&json!([])), "[]");
        assert_eq!(encode_arguments(&json!({})), "{}");
        assert_eq!(encode_arguments(&json!("plain")), r#""plain""#);
    }

    #[test]
    fn test_encode_arguments_keeps_key_order_and_unicode() {
        let value: Value = serde_json::from_str(r#"{"zeta": 1, "alpha": "数据"}"#).unwrap();
        assert_eq!(encode_arguments(&value), r#"{"zeta": 1, "alpha": "数据"}"#);
    }

    #[test]
    fn test_encoded_arguments_parse_back() {
        let input = json!({"path": "/tmp/a b", "flags": ["-r", "-f"], "depth": 2.5});
        let encoded = encode_arguments(&input);
        let parsed: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(parsed, input);
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!("2024-01-01T00:00:00Z")), "2024-01-01T00:00:00Z");
        assert_eq!(scalar_text(&json!(1712345678)), "1712345678");
        assert_eq!(scalar_text(&json!(null)), "");
        assert_eq!(scalar_text(&json!(true)), "true");
    }

    #[test]
    fn test_text_or_defaults() {
        let doc = json!({"id": null, "model": "gpt-4o"});
        let doc = doc.as_object().unwrap();
        assert_eq!(text_or(doc, "id", "unknown"), "unknown");
        assert_eq!(text_or(doc, "missing", "unknown"), "unknown");
        assert_eq!(text_or(doc, "model", "unknown"), "gpt-4o");
    }

    #[test]
    fn test_flatten_content() {
        assert_eq!(flatten_content(None), "");
        assert_eq!(flatten_content(Some(&json!(null))), "");
        assert_eq!(flatten_content(Some(&json!("hello"))), "hello");
        let blocks = json!([
            {"type": "text", "text": "first"},
            {"type": "image", "source": {}},
            {"type": "text", "text": "second"}
        ]);
        assert_eq!(flatten_content(Some(&blocks)), "first\nsecond");
    }
}
