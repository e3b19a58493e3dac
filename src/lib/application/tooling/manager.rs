use super::error::ToolInvokeError;
use super::interface::{ToolCatalog, ToolOutput, ToolProvider};
use super::process::McpProcess;
use crate::config::ServerConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Owns every configured MCP server for the lifetime of a session.
pub struct ServerManager {
    processes: Vec<McpProcess>,
}

impl ServerManager {
    /// Starts all servers up front. If one fails, those already running are
    /// stopped before the error is returned.
    pub async fn connect(configs: Vec<ServerConfig>) -> Result<Self, ToolInvokeError> {
        let mut processes: Vec<McpProcess> = Vec::with_capacity(configs.len());
        for config in configs {
            info!(server = %config.name, command = %config.command.display(), "Starting MCP server");
            let process = McpProcess::new(config);
            if let Err(err) = process.start().await {
                for started in &processes {
                    started.shutdown().await;
                }
                return Err(err);
            }
            processes.push(process);
        }
        Ok(Self { processes })
    }

    async fn route(&self, tool: &str) -> Option<&McpProcess> {
        for process in &self.processes {
            if process.tools().await.iter().any(|info| info.name == tool) {
                return Some(process);
            }
        }
        None
    }
}

#[async_trait]
impl ToolProvider for ServerManager {
    async fn catalog(&self) -> ToolCatalog {
        let mut seen = HashSet::new();
        let mut tools = Vec::new();
        for process in &self.processes {
            for tool in process.tools().await {
                if seen.insert(tool.name.clone()) {
                    tools.push(tool);
                } else {
                    warn!(
                        server = process.name(),
                        tool = %tool.name,
                        "Tool name already provided by another server; ignoring duplicate"
                    );
                }
            }
        }
        ToolCatalog::new(tools)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolOutput, ToolInvokeError> {
        let process = self
            .route(name)
            .await
            .ok_or_else(|| ToolInvokeError::UnknownTool {
                tool: name.to_string(),
            })?;
        debug!(server = process.name(), tool = name, "Invoking MCP tool");
        let result = process.call_tool(name, arguments).await?;
        Ok(ToolOutput::from_call_result(&result))
    }

    async fn shutdown(&self) {
        for process in &self.processes {
            debug!(server = process.name(), "Stopping MCP server");
            process.shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn empty_manager_has_no_tools() {
        let manager = ServerManager::connect(Vec::new()).await.expect("connect");
        assert!(manager.catalog().await.is_empty());
        let err = manager
            .call_tool("add", json!({"a": 1, "b": 2}))
            .await
            .expect_err("no servers");
        assert!(matches!(err, ToolInvokeError::UnknownTool { ref tool } if tool == "add"));
        manager.shutdown().await;
    }
}
