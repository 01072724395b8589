use serde_json::{Map, Value};
use toolmark_types::{CanonicalSession, RawDocument, SourceFormat};

use crate::Result;
use crate::chat::convert_messages;
use crate::fields::text_or;
use crate::traits::{Evidence, FormatDetector, ProbeResult};

/// OpenAI chat-completion transcripts: `{"id", "created", "model", "messages": [...]}`
pub struct OpenAiFormat;

impl FormatDetector for OpenAiFormat {
    fn format(&self) -> SourceFormat {
        SourceFormat::OpenAi
    }

    fn probe(&self, doc: &RawDocument) -> ProbeResult {
        let messages = doc.get("messages").and_then(Value::as_array);
        let non_empty = messages.is_some_and(|m| !m.is_empty());
        let first_has_role_and_content = messages
            .and_then(|m| m.first())
            .and_then(Value::as_object)
            .is_some_and(|first| first.contains_key("role") && first.contains_key("content"));

        Evidence::new()
            .add(doc.contains_key("messages"), 5)
            .add(non_empty, 3)
            .add(non_empty && first_has_role_and_content, 2)
            .finish()
    }

    fn transform(&self, doc: &RawDocument) -> Result<CanonicalSession> {
        let transcript = convert_messages(doc, SourceFormat::OpenAi)?;

        let created_at = if doc.get("created").is_some_and(|v| !v.is_null()) {
            text_or(doc, "created", "")
        } else {
            text_or(doc, "created_at", "")
        };

        let mut metadata = Map::new();
        metadata.insert(
            CanonicalSession::SOURCE_FORMAT_KEY.to_string(),
            Value::from(SourceFormat::OpenAi.as_str()),
        );
        if let Some(prompt) = transcript.system_prompt {
            metadata.insert("system_prompt".to_string(), Value::from(prompt));
        }

        Ok(CanonicalSession {
            session_id: text_or(doc, "id", CanonicalSession::UNKNOWN),
            created_at,
            model: text_or(doc, "model", CanonicalSession::UNKNOWN),
            metadata,
            messages: transcript.messages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> RawDocument {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_probe_weights() {
        assert_eq!(OpenAiFormat.probe(&doc(json!({}))), ProbeResult::NoMatch);
        assert_eq!(
            OpenAiFormat.probe(&doc(json!({"messages": []}))).confidence(),
            0.5
        );
        assert_eq!(
            OpenAiFormat
                .probe(&doc(json!({"messages": [{"role": "user"}]})))
                .confidence(),
            0.8
        );
        assert_eq!(
            OpenAiFormat
                .probe(&doc(json!({"messages": [{"role": "user", "content": "hi"}]})))
                .confidence(),
            1.0
        );
    }

    #[test]
    fn test_probe_non_array_messages() {
        let probe = OpenAiFormat.probe(&doc(json!({"messages": "nope"})));
        assert_eq!(probe.confidence(), 0.5);
    }

    #[test]
    fn test_transform_session_fields() {
        let session = OpenAiFormat
            .transform(&doc(json!({
                "id": "chatcmpl-1",
                "created": 1712345678,
                "model": "gpt-4o",
                "messages": [{"role": "user", "content": "hi"}]
            })))
            .unwrap();

        assert_eq!(session.session_id, "chatcmpl-1");
        assert_eq!(session.created_at, "1712345678");
        assert_eq!(session.model, "gpt-4o");
        assert_eq!(session.source_format(), Some("openai"));
    }

    #[test]
    fn test_transform_defaults() {
        let session = OpenAiFormat
            .transform(&doc(json!({"messages": []})))
            .unwrap();
        assert_eq!(session.session_id, "unknown");
        assert_eq!(session.created_at, "");
        assert_eq!(session.model, "unknown");
        assert!(session.messages.is_empty());
    }

    #[test]
    fn test_transform_falls_back_to_created_at() {
        let session = OpenAiFormat
            .transform(&doc(json!({
                "created_at": "2024-05-01T10:00:00Z",
                "messages": []
            })))
            .unwrap();
        assert_eq!(session.created_at, "2024-05-01T10:00:00Z");
    }
}
