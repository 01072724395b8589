use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Untyped JSON object as uploaded, before any format is known
pub type RawDocument = Map<String, Value>;

/// Source format a session was imported from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    OpenAi,
    Anthropic,
    Custom,
}

impl SourceFormat {
    /// All formats in detector registration order
    pub const ALL: [SourceFormat; 3] = [
        SourceFormat::OpenAi,
        SourceFormat::Anthropic,
        SourceFormat::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::OpenAi => "openai",
            SourceFormat::Anthropic => "anthropic",
            SourceFormat::Custom => "custom",
        }
    }

    /// Human-readable family name used in error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceFormat::OpenAi => "OpenAI",
            SourceFormat::Anthropic => "Anthropic",
            SourceFormat::Custom => "custom trace",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Speaker of a canonical message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }

    /// Map a provider role string; `None` for roles outside the canonical set
    pub fn from_provider(role: &str) -> Option<Self> {
        match role {
            "user" => Some(MessageRole::User),
            "assistant" => Some(MessageRole::Assistant),
            "tool" => Some(MessageRole::Tool),
            _ => None,
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Function name and JSON-encoded arguments of a tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON text, not a nested object
    pub arguments: String,
}

/// A tool invocation attached to an assistant message
///
/// `id` is only unique within the owning message's `tool_calls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

impl ToolCall {
    pub const FUNCTION_KIND: &'static str = "function";

    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: Self::FUNCTION_KIND.to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl CanonicalMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = Some(tool_calls);
        self
    }

    pub fn with_tool_call_id(mut self, tool_call_id: impl Into<String>) -> Self {
        self.tool_call_id = Some(tool_call_id.into());
        self
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or_default()
    }
}

/// Format-independent representation of an imported conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSession {
    pub session_id: String,
    pub created_at: String,
    pub model: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub messages: Vec<CanonicalMessage>,
}

impl CanonicalSession {
    pub const UNKNOWN: &'static str = "unknown";
    pub const SOURCE_FORMAT_KEY: &'static str = "source_format";

    pub fn source_format(&self) -> Option<&str> {
        self.metadata
            .get(Self::SOURCE_FORMAT_KEY)
            .and_then(Value::as_str)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn tool_call_count(&self) -> usize {
        self.messages.iter().map(|m| m.tool_calls().len()).sum()
    }
}
