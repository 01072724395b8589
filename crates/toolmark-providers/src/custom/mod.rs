pub(crate) mod schema;

use serde_json::{Map, Value};
use toolmark_types::{CanonicalMessage, CanonicalSession, MessageRole, RawDocument, SourceFormat, ToolCall};

use crate::fields::{encode_arguments, scalar_text, text_or};
use crate::traits::{Evidence, FormatDetector, ProbeResult};
use crate::{Error, Result};

use self::schema::{AgentConfig, TraceAction};

const FORMAT: SourceFormat = SourceFormat::Custom;

/// In-house agent traces: `{"trace_id", "timestamp", "agent_config", "conversation_turns": [...]}`
pub struct CustomTraceFormat;

impl FormatDetector for CustomTraceFormat {
    fn format(&self) -> SourceFormat {
        FORMAT
    }

    fn probe(&self, doc: &RawDocument) -> ProbeResult {
        Evidence::new()
            .add(doc.contains_key("trace_id"), 4)
            .add(doc.contains_key("conversation_turns"), 4)
            .add(doc.contains_key("agent_config"), 2)
            .finish()
    }

    fn transform(&self, doc: &RawDocument) -> Result<CanonicalSession> {
        let turns: &[Value] = match doc.get("conversation_turns") {
            None | Some(Value::Null) => &[],
            Some(Value::Array(turns)) => turns,
            Some(_) => {
                return Err(Error::mismatch(
                    FORMAT,
                    "'conversation_turns' is not an array",
                ));
            }
        };

        let agent_config: AgentConfig = match doc.get("agent_config") {
            None | Some(Value::Null) => AgentConfig::default(),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| Error::mismatch(FORMAT, format!("invalid 'agent_config': {}", e)))?,
        };

        let mut messages = Vec::with_capacity(turns.len());
        for (i, turn) in turns.iter().enumerate() {
            if let Some(message) = convert_turn(i, turn)? {
                messages.push(message);
            }
        }

        let model = match &agent_config.model_name {
            None | Some(Value::Null) => CanonicalSession::UNKNOWN.to_string(),
            Some(value) => scalar_text(value),
        };

        let mut metadata = Map::new();
        metadata.insert(
            CanonicalSession::SOURCE_FORMAT_KEY.to_string(),
            Value::from(FORMAT.as_str()),
        );
        metadata.insert(
            "temperature".to_string(),
            agent_config.temperature.unwrap_or(Value::Null),
        );

        Ok(CanonicalSession {
            session_id: text_or(doc, "trace_id", CanonicalSession::UNKNOWN),
            created_at: text_or(doc, "timestamp", ""),
            model,
            metadata,
            messages,
        })
    }
}

/// Convert one turn; `None` for speakers outside user/assistant/tool
///
/// Only the fields the speaker's role reads are looked at, so a dropped turn
/// can never fail the import.
fn convert_turn(i: usize, turn: &Value) -> Result<Option<CanonicalMessage>> {
    let role = match turn
        .get("speaker_type")
        .and_then(Value::as_str)
        .and_then(MessageRole::from_provider)
    {
        Some(role) => role,
        None => return Ok(None),
    };

    let text = required_str(i, turn, "text")?;
    let message = CanonicalMessage::new(role, text);

    let message = match role {
        MessageRole::User => message,
        MessageRole::Assistant => match turn.get("actions") {
            None | Some(Value::Null) => message,
            Some(actions) => {
                let actions: Vec<TraceAction> = serde_json::from_value(actions.clone())
                    .map_err(|e| {
                        Error::mismatch(
                            FORMAT,
                            format!("conversation_turns[{}].actions is invalid: {}", i, e),
                        )
                    })?;
                if actions.is_empty() {
                    message
                } else {
                    message.with_tool_calls(actions.into_iter().map(action_to_call).collect())
                }
            }
        },
        MessageRole::Tool => message.with_tool_call_id(required_str(i, turn, "action_ref_id")?),
    };

    Ok(Some(message))
}

fn required_str<'a>(i: usize, turn: &'a Value, key: &str) -> Result<&'a str> {
    match turn.get(key) {
        None | Some(Value::Null) => Err(Error::mismatch(
            FORMAT,
            format!("conversation_turns[{}] is missing '{}'", i, key),
        )),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(Error::mismatch(
            FORMAT,
            format!("conversation_turns[{}].{} is not a string", i, key),
        )),
    }
}

fn action_to_call(action: TraceAction) -> ToolCall {
    ToolCall::function(
        action.action_id,
        action.tool_name,
        encode_arguments(&action.tool_input),
    )
}
