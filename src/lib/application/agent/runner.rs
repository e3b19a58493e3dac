use super::errors::AgentError;
use crate::application::tooling::{ToolCatalog, ToolProvider};
use crate::application::transcript::normalize_turn;
use crate::constants::{DEFAULT_MAX_STEPS, DEFAULT_MAX_TOKENS};
use crate::domain::{ToolStatus, Turn};
use crate::model::{ModelProvider, ModelRequest};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Produces the raw turns answering the last user turn of `history`.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn invoke(
        &self,
        history: &[Turn],
        catalog: &ToolCatalog,
    ) -> Result<Vec<Value>, AgentError>;
}

#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub provider: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub max_steps: usize,
    pub max_tokens: u32,
}

impl AgentOptions {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            system_prompt: None,
            max_steps: DEFAULT_MAX_STEPS,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

pub struct ToolCallingAgent<P: ModelProvider, T: ToolProvider + ?Sized> {
    provider: Arc<P>,
    tools: Arc<T>,
    options: AgentOptions,
}

struct PlannedCall {
    id: Option<String>,
    name: String,
    arguments: Value,
}

impl<P: ModelProvider, T: ToolProvider + ?Sized> ToolCallingAgent<P, T> {
    pub fn new(provider: Arc<P>, tools: Arc<T>, options: AgentOptions) -> Self {
        Self {
            provider,
            tools,
            options,
        }
    }

    /// Runs one tool call; failures become an `error` tool turn instead of aborting.
    async fn execute(&self, call: PlannedCall) -> Value {
        debug!(tool = call.name.as_str(), arguments = %call.arguments, "Executing tool");
        let (content, status) = match self.tools.call_tool(&call.name, call.arguments).await {
            Ok(output) => {
                let status = if output.is_error {
                    ToolStatus::Error
                } else {
                    ToolStatus::Success
                };
                (output.text, status)
            }
            Err(err) => {
                warn!(tool = call.name.as_str(), error = %err, "Tool invocation failed");
                (err.user_message(), ToolStatus::Error)
            }
        };
        info!(
            tool = call.name.as_str(),
            status = status.as_str(),
            "Tool execution finished"
        );

        let mut turn = Map::new();
        turn.insert("type".into(), json!("tool"));
        turn.insert("name".into(), json!(call.name));
        if let Some(id) = call.id {
            turn.insert("tool_call_id".into(), json!(id));
        }
        turn.insert("content".into(), json!(content));
        turn.insert("status".into(), json!(status.as_str()));
        Value::Object(turn)
    }
}

#[async_trait]
impl<P, T> AgentRuntime for ToolCallingAgent<P, T>
where
    P: ModelProvider,
    T: ToolProvider + ?Sized,
{
    async fn invoke(
        &self,
        history: &[Turn],
        catalog: &ToolCatalog,
    ) -> Result<Vec<Value>, AgentError> {
        info!(
            provider = self.options.provider.as_str(),
            model = self.options.model.as_str(),
            history = history.len(),
            tools = catalog.len(),
            "Agent run started"
        );

        let mut conversation = history.to_vec();
        let mut produced = Vec::new();
        let mut rounds = 0usize;

        loop {
            let request = ModelRequest {
                provider: self.options.provider.clone(),
                model: self.options.model.clone(),
                system_prompt: self.options.system_prompt.clone(),
                messages: conversation.clone(),
                tools: catalog.descriptors().to_vec(),
                max_tokens: self.options.max_tokens,
            };
            debug!(
                messages = request.messages.len(),
                rounds, "Submitting agent turn to model provider"
            );
            let response = match self.provider.chat(request).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(rounds, error = %err, "Model call failed");
                    return Err(AgentError::interrupted(produced, err.into()));
                }
            };

            let reply = normalize_turn(&response.message);
            let calls: Vec<PlannedCall> = reply
                .tool_uses()
                .map(|(id, name, arguments)| PlannedCall {
                    id: id.clone(),
                    name: name.to_string(),
                    arguments: Value::Object(arguments.iter().cloned().collect()),
                })
                .collect();

            if calls.is_empty() {
                produced.push(response.message);
                info!(turns = produced.len(), rounds, "Agent returned final response");
                return Ok(produced);
            }
            // The reply that asked for one round too many is dropped so the
            // history never holds a tool call without its result.
            if rounds >= self.options.max_steps {
                warn!(
                    limit = self.options.max_steps,
                    "Agent exceeded max tool interactions"
                );
                let limit = AgentError::StepLimit {
                    limit: self.options.max_steps,
                };
                return Err(AgentError::interrupted(produced, limit));
            }
            rounds += 1;
            conversation.push(reply);
            produced.push(response.message);

            for call in calls {
                let raw = self.execute(call).await;
                conversation.push(normalize_turn(&raw));
                produced.push(raw);
            }
        }
    }
}
