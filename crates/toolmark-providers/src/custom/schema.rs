use serde::Deserialize;
use serde_json::Value;

/// A tool invocation recorded on an assistant turn
#[derive(Debug, Deserialize)]
pub(crate) struct TraceAction {
    pub action_id: String,
    pub tool_name: String,
    /// Required; an explicit `null` is kept and encoded as `null`
    pub tool_input: Value,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AgentConfig {
    #[serde(default)]
    pub model_name: Option<Value>,
    #[serde(default)]
    pub temperature: Option<Value>,
}
