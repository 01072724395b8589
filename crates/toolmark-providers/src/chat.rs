//! Message conversion shared by the chat-completion style formats
//! (OpenAI and Anthropic), whose messages already carry `role`/`content`
//! and, for tool use, canonical-shaped `tool_calls` / `tool_call_id`.
//!
//! Those tool fields are copied only after they are checked against the
//! canonical shape.

use serde_json::{Map, Value};
use toolmark_types::{CanonicalMessage, MessageRole, RawDocument, SourceFormat, ToolCall};

use crate::fields::flatten_content;
use crate::{Error, Result};

/// Converted message list plus any system prompt pulled out of it
#[derive(Debug, Default)]
pub(crate) struct ChatTranscript {
    pub messages: Vec<CanonicalMessage>,
    pub system_prompt: Option<String>,
}

pub(crate) fn convert_messages(doc: &RawDocument, format: SourceFormat) -> Result<ChatTranscript> {
    let raw_messages = match doc.get("messages") {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(Error::mismatch(format, "'messages' must be an array")),
        None => return Err(Error::mismatch(format, "missing 'messages'")),
    };

    let mut transcript = ChatTranscript::default();
    let mut system_parts: Vec<String> = Vec::new();

    for (i, raw) in raw_messages.iter().enumerate() {
        let msg = raw
            .as_object()
            .ok_or_else(|| Error::mismatch(format, format!("messages[{}] must be an object", i)))?;

        let role = msg.get("role").and_then(Value::as_str).ok_or_else(|| {
            Error::mismatch(format, format!("messages[{}] is missing a string 'role'", i))
        })?;
        let content = flatten_content(msg.get("content"));

        if role == "system" {
            system_parts.push(content);
            continue;
        }

        let role = MessageRole::from_provider(role).ok_or_else(|| {
            Error::mismatch(
                format,
                format!("messages[{}] has unsupported role '{}'", i, role),
            )
        })?;

        let mut message = CanonicalMessage::new(role, content);

        if let Some(value) = msg.get("tool_calls") {
            let calls = validate_tool_calls(value, i, format)?;
            if !calls.is_empty() {
                message = message.with_tool_calls(calls);
            }
        }

        match msg.get("tool_call_id") {
            None | Some(Value::Null) => {}
            Some(Value::String(id)) => message = message.with_tool_call_id(id.clone()),
            Some(_) => {
                return Err(Error::mismatch(
                    format,
                    format!("messages[{}].tool_call_id must be a string", i),
                ));
            }
        }

        transcript.messages.push(message);
    }

    if !system_parts.is_empty() {
        transcript.system_prompt = Some(system_parts.join("\n\n"));
    }

    Ok(transcript)
}

fn validate_tool_calls(value: &Value, msg_idx: usize, format: SourceFormat) -> Result<Vec<ToolCall>> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        _ => {
            return Err(Error::mismatch(
                format,
                format!("messages[{}].tool_calls must be an array", msg_idx),
            ));
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(j, item)| {
            let path = format!("messages[{}].tool_calls[{}]", msg_idx, j);
            let call = item
                .as_object()
                .ok_or_else(|| Error::mismatch(format, format!("{} must be an object", path)))?;
            validate_tool_call(call, &path, format)
        })
        .collect()
}

fn validate_tool_call(call: &Map<String, Value>, path: &str, format: SourceFormat) -> Result<ToolCall> {
    let id = require_str(call, "id", path, format)?;

    match call.get("type") {
        None => {}
        Some(Value::String(kind)) if kind == ToolCall::FUNCTION_KIND => {}
        Some(_) => {
            return Err(Error::mismatch(
                format,
                format!("{}.type must be \"function\"", path),
            ));
        }
    }

    let function_path = format!("{}.function", path);
    let function = call
        .get("function")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::mismatch(format, format!("{} must be an object", function_path)))?;

    let name = require_str(function, "name", &function_path, format)?;
    let arguments = require_str(function, "arguments", &function_path, format)?;

    if serde_json::from_str::<Value>(arguments).is_err() {
        return Err(Error::mismatch(
            format,
            format!("{}.arguments is not valid JSON text", function_path),
        ));
    }

    Ok(ToolCall::function(id, name, arguments))
}

fn require_str<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
    format: SourceFormat,
) -> Result<&'a str> {
    obj.get(key).and_then(Value::as_str).ok_or_else(|| {
        Error::mismatch(format, format!("{}.{} must be a string", path, key))
    })
}
