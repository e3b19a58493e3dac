use async_trait::async_trait;
use serde_json::Value;

use super::error::ToolInvokeError;

#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
    /// Name of the configured server that owns the tool.
    pub server: String,
}

/// Tools discovered at session start.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        Self { tools }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    /// Flattens an MCP `tools/call` result into text.
    pub fn from_call_result(result: &Value) -> Self {
        let is_error = result
            .get("isError")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let parts: Vec<&str> = result
            .get("content")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
                    .filter_map(|item| item.get("text").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();

        let text = if !parts.is_empty() {
            parts.join("\n")
        } else if let Some(structured) = result.get("structuredContent") {
            structured.to_string()
        } else {
            String::new()
        };

        Self { text, is_error }
    }
}

#[async_trait]
pub trait ToolProvider: Send + Sync {
    async fn catalog(&self) -> ToolCatalog;

    async fn call_tool(&self, name: &str, arguments: Value)
    -> Result<ToolOutput, ToolInvokeError>;

    /// Releases the underlying connections. Safe to call more than once.
    async fn shutdown(&self);
}
