use crate::error::ToolError;
use crate::protocol::{JSONRPC_VERSION, PROTOCOL_VERSION, RpcRequest, RpcResponse};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Tool advertised through `tools/list`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolSpec {
    pub fn new(name: &str, description: &str, input_schema: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

#[async_trait]
pub trait ToolSet: Send + Sync {
    /// Reported as `serverInfo.name` during the handshake.
    fn server_name(&self) -> &str;

    fn tools(&self) -> Vec<ToolSpec>;

    async fn call(&self, name: &str, arguments: &Map<String, Value>) -> Result<String, ToolError>;
}

/// Serves a [`ToolSet`] over newline-delimited JSON-RPC.
pub struct McpServer<T: ToolSet> {
    tools: T,
}

impl<T: ToolSet> McpServer<T> {
    pub fn new(tools: T) -> Self {
        Self { tools }
    }

    /// Runs until the reader reaches end of input.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(server = self.tools.server_name(), "MCP server listening on stdio");
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                let mut encoded = serde_json::to_string(&response)?;
                encoded.push('\n');
                writer.write_all(encoded.as_bytes()).await?;
                writer.flush().await?;
            }
        }
        info!(server = self.tools.server_name(), "Input closed, shutting down");
        Ok(())
    }

    /// Returns the response to send, if any. Notifications and stray
    /// responses produce nothing.
    pub async fn handle_line(&self, line: &str) -> Option<RpcResponse> {
        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(err) => {
                warn!(%err, "Received malformed JSON");
                return Some(RpcResponse::parse_error(format!("Parse error: {err}")));
            }
        };

        if message.get("method").is_none()
            && (message.get("result").is_some() || message.get("error").is_some())
        {
            debug!("Ignoring response message from client");
            return None;
        }

        let id = message.get("id").cloned();
        let request: RpcRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(err) => return Some(RpcResponse::invalid_request(id, err.to_string())),
        };
        self.handle(request).await
    }

    pub async fn handle(&self, request: RpcRequest) -> Option<RpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return (!request.is_notification()).then(|| {
                RpcResponse::invalid_request(
                    request.id.clone(),
                    "Unsupported jsonrpc version (expected 2.0)",
                )
            });
        }

        debug!(method = %request.method, "Received JSON-RPC message");
        if request.is_notification() {
            match request.method.as_str() {
                "notifications/initialized" => info!("Client finished initialization"),
                other => debug!(method = other, "Ignoring notification"),
            }
            return None;
        }

        let id = request.id.clone();
        let response = match request.method.as_str() {
            "initialize" => self.initialize(id, request.params.as_ref()),
            "ping" => RpcResponse::success(id, json!({})),
            "tools/list" => self.list_tools(id),
            "tools/call" => self.call_tool(id, request.params).await,
            other => {
                warn!(method = other, "Unknown JSON-RPC method");
                RpcResponse::method_not_found(id, other)
            }
        };
        Some(response)
    }

    fn initialize(&self, id: Option<Value>, params: Option<&Value>) -> RpcResponse {
        let requested = params
            .and_then(|params| params.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(PROTOCOL_VERSION);
        info!(client_protocol = requested, "Handshake with client");
        RpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": { "listChanged": false } },
                "serverInfo": {
                    "name": self.tools.server_name(),
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        )
    }

    fn list_tools(&self, id: Option<Value>) -> RpcResponse {
        let tools: Vec<Value> = self
            .tools
            .tools()
            .into_iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": tool.input_schema,
                })
            })
            .collect();
        RpcResponse::success(id, json!({ "tools": tools }))
    }

    async fn call_tool(&self, id: Option<Value>, params: Option<Value>) -> RpcResponse {
        let Some(Value::Object(mut params)) = params else {
            return RpcResponse::invalid_params(id, "params must be an object with name");
        };
        let Some(name) = params.get("name").and_then(Value::as_str).map(String::from) else {
            return RpcResponse::invalid_params(id, "params.name must be a string");
        };
        let arguments = match params.remove("arguments") {
            Some(Value::Object(arguments)) => arguments,
            Some(Value::Null) | None => Map::new(),
            Some(_) => {
                return RpcResponse::invalid_params(id, "params.arguments must be an object");
            }
        };

        match self.tools.call(&name, &arguments).await {
            Ok(text) => {
                info!(tool = name.as_str(), "Tool call succeeded");
                RpcResponse::success(id, tool_result(text, false))
            }
            Err(err) => {
                warn!(tool = name.as_str(), error = %err, "Tool call failed");
                RpcResponse::success(id, tool_result(err.to_string(), true))
            }
        }
    }
}

fn tool_result(text: String, is_error: bool) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl ToolSet for Echo {
        fn server_name(&self) -> &str {
            "echo"
        }

        fn tools(&self) -> Vec<ToolSpec> {
            vec![ToolSpec::new("echo", "Echo text back.", json!({"type": "object"}))]
        }

        async fn call(
            &self,
            name: &str,
            arguments: &Map<String, Value>,
        ) -> Result<String, ToolError> {
            match name {
                "echo" => Ok(arguments
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()),
                other => Err(ToolError::UnknownTool(other.to_string())),
            }
        }
    }

    async fn roundtrip(line: &str) -> Option<Value> {
        McpServer::new(Echo)
            .handle_line(line)
            .await
            .map(|response| serde_json::to_value(response).expect("encodes"))
    }

    #[tokio::test]
    async fn initialize_reports_server_info() {
        let response = roundtrip(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-06-18"}}"#,
        )
        .await
        .expect("response");
        assert_eq!(response["result"]["serverInfo"]["name"], "echo");
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn notifications_get_no_reply() {
        assert!(
            roundtrip(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn tools_call_wraps_text_and_errors() {
        let ok = roundtrip(
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"echo","arguments":{"text":"hi"}}}"#,
        )
        .await
        .expect("response");
        assert_eq!(ok["result"]["content"][0]["text"], "hi");
        assert_eq!(ok["result"]["isError"], false);

        let failed = roundtrip(
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"nope"}}"#,
        )
        .await
        .expect("response");
        assert_eq!(failed["result"]["isError"], true);
        assert_eq!(failed["result"]["content"][0]["text"], "Unknown tool: nope");
    }

    #[tokio::test]
    async fn protocol_errors_use_standard_codes() {
        let parse = roundtrip("{not json").await.expect("response");
        assert_eq!(parse["error"]["code"], -32700);
        assert!(parse["id"].is_null());

        let unknown = roundtrip(r#"{"jsonrpc":"2.0","id":"x","method":"resources/list"}"#)
            .await
            .expect("response");
        assert_eq!(unknown["error"]["code"], -32601);
        assert_eq!(unknown["id"], "x");

        let params = roundtrip(r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":[]}"#)
            .await
            .expect("response");
        assert_eq!(params["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn serve_answers_each_request_line() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n"
        );
        let mut output = Vec::new();
        McpServer::new(Echo)
            .serve(input.as_bytes(), &mut output)
            .await
            .expect("serve");

        let text = String::from_utf8(output).expect("utf8");
        let replies: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[1]["result"]["tools"][0]["name"], "echo");
    }
}
