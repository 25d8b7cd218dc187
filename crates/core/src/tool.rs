//! Tool trait: the abstraction over operations the model may request.
//!
//! Tools are registered once into a [`ToolRegistry`] at startup. The same
//! registry produces the definitions advertised to the model and resolves
//! the calls the model makes, so the two cannot drift apart.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;
use crate::provider::ToolDefinition;

/// A request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the model's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: Value,
}

/// The value a tool produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    /// Plain text, passed to the model verbatim
    Text(String),

    /// Structured data, JSON-encoded for the model
    Json(Value),
}

impl ToolResult {
    /// Serialize any `Serialize` value into a JSON result.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ToolError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// The content placed in the tool-result message.
    pub fn to_content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Json(value) => value.to_string(),
        }
    }

    /// The result as a JSON value (text becomes a JSON string).
    pub fn into_value(self) -> Value {
        match self {
            Self::Text(text) => Value::String(text),
            Self::Json(value) => value,
        }
    }
}

/// The core Tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "list_modules").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A fixed table of available tools, in registration order.
///
/// Built once before a run starts and shared behind an `Arc`; nothing
/// mutates it while the orchestrator is running.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Replaces any existing tool with the same name in place.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(index) => self.tools[index] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Get all tool definitions (for sending to the model).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// Execute a tool call.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        tool.execute(call.arguments.clone()).await
    }

    /// List all registered tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
            let text = arguments["text"]
                .as_str()
                .ok_or_else(|| ToolError::InvalidArguments("missing text".into()))?;
            Ok(ToolResult::Text(text.to_string()))
        }
    }

    struct NamedTool(&'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "named"
        }
        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {}, "required": []})
        }
        async fn execute(&self, _arguments: Value) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::Json(json!({"tool": self.0})))
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn registry_keeps_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(NamedTool("b")));
        registry.register(Box::new(NamedTool("a")));
        registry.register(Box::new(NamedTool("c")));
        registry.register(Box::new(NamedTool("a")));
        assert_eq!(registry.names(), ["b", "a", "c"]);
        let defs: Vec<_> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(defs, ["b", "a", "c"]);
    }

    #[tokio::test]
    async fn registry_execute_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let call = ToolCall {
            id: "call_1".into(),
            name: "echo".into(),
            arguments: json!({"text": "hello world"}),
        };
        let result = registry.execute(&call).await.unwrap();
        assert_eq!(result, ToolResult::Text("hello world".into()));
    }

    #[tokio::test]
    async fn registry_execute_missing_tool() {
        let registry = ToolRegistry::new();
        let call = ToolCall {
            id: "call_1".into(),
            name: "nonexistent".into(),
            arguments: json!({}),
        };
        let err = registry.execute(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[test]
    fn text_results_pass_through_verbatim() {
        let text = ToolResult::Text("already \"text\"".into());
        assert_eq!(text.to_content(), "already \"text\"");

        let json = ToolResult::Json(json!([{"id": "1"}]));
        assert_eq!(json.to_content(), r#"[{"id":"1"}]"#);
    }

    #[test]
    fn text_result_becomes_json_string_value() {
        let value = ToolResult::Text("hi".into()).into_value();
        assert_eq!(value, json!("hi"));
    }
}
