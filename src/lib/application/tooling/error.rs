use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolInvokeError {
    #[error("no MCP server provides tool '{tool}'")]
    UnknownTool { tool: String },
    #[error("failed to spawn MCP server '{server}': {source}")]
    Spawn {
        server: String,
        #[source]
        source: std::io::Error,
    },
    #[error("MCP server '{server}' transport error: {message}")]
    Transport { server: String, message: String },
    #[error("MCP server '{server}' returned invalid JSON: {source}")]
    InvalidJson {
        server: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("MCP server '{server}' returned JSON-RPC error {code}: {message}")]
    Rpc {
        server: String,
        code: i64,
        message: String,
    },
    #[error("MCP server '{server}' terminated unexpectedly")]
    Terminated { server: String },
    #[error("MCP server '{server}' request cancelled")]
    Cancelled { server: String },
}

impl ToolInvokeError {
    /// Text handed back to the model as the content of a failed tool result.
    pub fn user_message(&self) -> String {
        match self {
            ToolInvokeError::UnknownTool { tool } => format!("Unknown tool: {tool}"),
            ToolInvokeError::Rpc { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
