use super::error::ToolInvokeError;
use super::interface::ToolDescriptor;
use crate::config::ServerConfig;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tracing::{debug, info, warn};

const PROTOCOL_VERSION: &str = "2025-06-18";

type Responder = oneshot::Sender<Result<Value, ToolInvokeError>>;

/// One MCP server child process speaking line-delimited JSON-RPC over stdio.
#[derive(Clone)]
pub struct McpProcess {
    inner: Arc<ProcessInner>,
}

struct ProcessInner {
    server: ServerConfig,
    child: AsyncMutex<Option<Child>>,
    writer: AsyncMutex<Option<BufWriter<ChildStdin>>>,
    pending: AsyncMutex<HashMap<String, Responder>>,
    id_counter: AtomicU64,
    tools: AsyncMutex<Vec<ToolDescriptor>>,
}

impl McpProcess {
    pub fn new(server: ServerConfig) -> Self {
        Self {
            inner: Arc::new(ProcessInner {
                server,
                child: AsyncMutex::new(None),
                writer: AsyncMutex::new(None),
                pending: AsyncMutex::new(HashMap::new()),
                id_counter: AtomicU64::new(1),
                tools: AsyncMutex::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.server.name
    }

    /// Spawns the server and performs the MCP handshake and tool discovery.
    pub async fn start(&self) -> Result<(), ToolInvokeError> {
        self.inner.start().await
    }

    pub async fn tools(&self) -> Vec<ToolDescriptor> {
        self.inner.tools.lock().await.clone()
    }

    pub async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolInvokeError> {
        if self.inner.child.lock().await.is_none() {
            return Err(ToolInvokeError::Terminated {
                server: self.inner.server.name.clone(),
            });
        }
        let params = json!({
            "name": tool,
            "arguments": match arguments {
                Value::Null => Value::Object(Default::default()),
                other => other,
            }
        });
        self.inner.send_request("tools/call", params).await
    }

    pub async fn shutdown(&self) {
        self.inner.reset().await;
    }
}

impl ProcessInner {
    async fn start(self: &Arc<Self>) -> Result<(), ToolInvokeError> {
        if self.child.lock().await.is_some() {
            return Ok(());
        }

        let mut command = Command::new(&self.server.command);
        command
            .args(&self.server.args)
            .envs(&self.server.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &self.server.workdir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| ToolInvokeError::Spawn {
            server: self.server.name.clone(),
            source,
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.transport_error("failed to capture server stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.transport_error("failed to capture server stdout"))?;

        *self.writer.lock().await = Some(BufWriter::new(stdin));
        *self.child.lock().await = Some(child);

        let reader = Arc::clone(self);
        tokio::spawn(async move {
            reader.reader_loop(stdout).await;
        });

        if let Err(err) = self.handshake().await {
            self.reset().await;
            return Err(err);
        }

        info!(
            server = %self.server.name,
            tools = self.tools.lock().await.len(),
            "MCP server ready"
        );
        Ok(())
    }

    async fn handshake(&self) -> Result<(), ToolInvokeError> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": {}
        });
        let init = self.send_request("initialize", params).await?;
        debug!(
            server = %self.server.name,
            remote = ?init.pointer("/serverInfo/name"),
            "MCP initialize acknowledged"
        );
        self.send_notification("notifications/initialized", json!({}))
            .await?;
        self.refresh_tools().await
    }

    async fn refresh_tools(&self) -> Result<(), ToolInvokeError> {
        let result = self.send_request("tools/list", json!({})).await?;
        let descriptors = result
            .get("tools")
            .and_then(Value::as_array)
            .map(|tools| {
                tools
                    .iter()
                    .filter_map(|tool| {
                        let name = tool.get("name").and_then(Value::as_str)?;
                        Some(ToolDescriptor {
                            name: name.to_string(),
                            description: tool
                                .get("description")
                                .and_then(Value::as_str)
                                .map(String::from),
                            input_schema: tool
                                .get("inputSchema")
                                .cloned()
                                .unwrap_or_else(|| json!({"type": "object"})),
                            server: self.server.name.clone(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        *self.tools.lock().await = descriptors;
        Ok(())
    }

    async fn reader_loop(self: Arc<Self>, stdout: ChildStdout) {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(raw)) = lines.next_line().await {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(message) => self.dispatch(message).await,
                Err(source) => warn!(
                    server = %self.server.name,
                    line = trimmed,
                    %source,
                    "received non-JSON line from MCP server"
                ),
            }
        }
        debug!(server = %self.server.name, "MCP server stdout closed");
        self.reset().await;
    }

    async fn dispatch(self: &Arc<Self>, message: Value) {
        let has_method = message.get("method").is_some();
        let outcome = match (message.get("id").cloned(), has_method) {
            (Some(id), true) => self.handle_server_request(id, &message).await,
            (Some(id), false) => {
                self.handle_response(&id, message).await;
                Ok(())
            }
            (None, true) => {
                self.handle_notification(&message);
                Ok(())
            }
            (None, false) => Ok(()),
        };
        if let Err(err) = outcome {
            warn!(server = %self.server.name, %err, "failed to process MCP message");
        }
    }

    async fn handle_response(&self, id: &Value, message: Value) {
        let Some(key) = response_key(id) else {
            return;
        };
        let Some(responder) = self.pending.lock().await.remove(&key) else {
            debug!(server = %self.server.name, response_id = key, "response for unknown request");
            return;
        };

        let outcome = match message.get("error") {
            Some(error) => Err(ToolInvokeError::Rpc {
                server: self.server.name.clone(),
                code: error.get("code").and_then(Value::as_i64).unwrap_or(-32000),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            }),
            None => Ok(message.get("result").cloned().unwrap_or(Value::Null)),
        };
        let _ = responder.send(outcome);
    }

    async fn handle_server_request(&self, id: Value, message: &Value) -> Result<(), ToolInvokeError> {
        match message.get("method").and_then(Value::as_str) {
            Some("ping") => {
                self.write_message(&json!({"jsonrpc": "2.0", "id": id, "result": {}}))
                    .await
            }
            other => {
                warn!(server = %self.server.name, method = ?other, "unsupported server request");
                self.write_message(&json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {
                        "code": -32601,
                        "message": format!("client does not implement method '{}'", other.unwrap_or_default()),
                    }
                }))
                .await
            }
        }
    }

    /// The catalog refresh runs on its own task; awaiting it here would block
    /// the reader that has to deliver the `tools/list` response.
    fn handle_notification(self: &Arc<Self>, message: &Value) {
        let method = message.get("method").and_then(Value::as_str).unwrap_or_default();
        debug!(server = %self.server.name, method, "MCP notification");
        if method == "notifications/tools/list_changed" {
            let this = Arc::clone(self);
            tokio::spawn(async move {
                if let Err(err) = this.refresh_tools().await {
                    warn!(server = %this.server.name, %err, "failed to refresh tool catalogue");
                }
            });
        }
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value, ToolInvokeError> {
        let id = format!("req-{}", self.id_counter.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        });
        if let Err(err) = self.write_message(&payload).await {
            self.pending.lock().await.remove(&id);
            return Err(err);
        }

        rx.await.unwrap_or_else(|_| {
            Err(ToolInvokeError::Cancelled {
                server: self.server.name.clone(),
            })
        })
    }

    async fn send_notification(&self, method: &str, params: Value) -> Result<(), ToolInvokeError> {
        self.write_message(&json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params
        }))
        .await
    }

    async fn write_message(&self, message: &Value) -> Result<(), ToolInvokeError> {
        let mut encoded =
            serde_json::to_vec(message).map_err(|source| ToolInvokeError::InvalidJson {
                server: self.server.name.clone(),
                source,
            })?;
        encoded.push(b'\n');

        let mut writer = self.writer.lock().await;
        let stream = writer
            .as_mut()
            .ok_or_else(|| self.transport_error("writer not initialised"))?;
        stream
            .write_all(&encoded)
            .await
            .map_err(|err| self.transport_error(err.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|err| self.transport_error(err.to_string()))
    }

    /// Closes stdin, stops the child and fails every request still in flight.
    async fn reset(&self) {
        if let Some(mut writer) = self.writer.lock().await.take() {
            let _ = writer.shutdown().await;
        }

        if let Some(mut child) = self.child.lock().await.take() {
            if let Err(err) = child.kill().await {
                debug!(server = %self.server.name, %err, "MCP server already exited");
            }
        }

        let mut pending = self.pending.lock().await;
        for (_, responder) in pending.drain() {
            let _ = responder.send(Err(ToolInvokeError::Terminated {
                server: self.server.name.clone(),
            }));
        }
    }

    fn transport_error(&self, message: impl Into<String>) -> ToolInvokeError {
        ToolInvokeError::Transport {
            server: self.server.name.clone(),
            message: message.into(),
        }
    }
}

fn response_key(id: &Value) -> Option<String> {
    match id {
        Value::String(value) => Some(value.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_keys_accept_strings_and_numbers() {
        assert_eq!(response_key(&json!("req-3")), Some("req-3".into()));
        assert_eq!(response_key(&json!(7)), Some("7".into()));
        assert_eq!(response_key(&json!(null)), None);
    }

    #[tokio::test]
    async fn spawn_failure_is_reported_with_server_name() {
        let process = McpProcess::new(ServerConfig {
            name: "missing".into(),
            command: "/definitely/not/a/real/binary".into(),
            args: Vec::new(),
            env: HashMap::new(),
            workdir: None,
        });
        let err = process.start().await.expect_err("spawn must fail");
        assert!(matches!(err, ToolInvokeError::Spawn { ref server, .. } if server == "missing"));
    }

    #[tokio::test]
    async fn calling_a_stopped_server_fails_fast() {
        let process = McpProcess::new(ServerConfig {
            name: "idle".into(),
            command: "unused".into(),
            args: Vec::new(),
            env: HashMap::new(),
            workdir: None,
        });
        let err = process
            .call_tool("add", json!({"a": 1}))
            .await
            .expect_err("not started");
        assert!(matches!(err, ToolInvokeError::Terminated { .. }));
    }
}
