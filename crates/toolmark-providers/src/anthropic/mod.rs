use serde_json::{Map, Value};
use toolmark_types::{CanonicalSession, RawDocument, SourceFormat};

use crate::Result;
use crate::chat::convert_messages;
use crate::fields::text_or;
use crate::traits::{Evidence, FormatDetector, ProbeResult};

/// Anthropic-style transcripts: `{"id", "created_at", "model": "claude-...", "messages": [...]}`
pub struct AnthropicFormat;

impl FormatDetector for AnthropicFormat {
    fn format(&self) -> SourceFormat {
        SourceFormat::Anthropic
    }

    fn probe(&self, doc: &RawDocument) -> ProbeResult {
        let claude_model = doc
            .get("model")
            .and_then(Value::as_str)
            .is_some_and(|m| m.starts_with("claude"));

        Evidence::new()
            .add(doc.contains_key("messages"), 4)
            .add(doc.contains_key("created_at"), 3)
            .add(claude_model, 3)
            .finish()
    }

    fn transform(&self, doc: &RawDocument) -> Result<CanonicalSession> {
        let transcript = convert_messages(doc, SourceFormat::Anthropic)?;

        let mut metadata = Map::new();
        metadata.insert(
            CanonicalSession::SOURCE_FORMAT_KEY.to_string(),
            Value::from(SourceFormat::Anthropic.as_str()),
        );
        if let Some(prompt) = transcript.system_prompt {
            metadata.insert("system_prompt".to_string(), Value::from(prompt));
        }

        Ok(CanonicalSession {
            session_id: text_or(doc, "id", CanonicalSession::UNKNOWN),
            created_at: text_or(doc, "created_at", ""),
            model: text_or(doc, "model", CanonicalSession::UNKNOWN),
            metadata,
            messages: transcript.messages,
        })
    }
}
