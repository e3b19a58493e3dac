//! Anthropic Messages API client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::config::ModelProviderConfig;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::factory::resolve_api_key;
use crate::infrastructure::model::traits::ModelClient;
use crate::infrastructure::model::types::{ModelError, ModelRequest, ModelResponse};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone)]
pub struct AnthropicClient {
    base: HttpClientBase,
    api_path: String,
}

impl AnthropicClient {
    pub fn from_config(config: &ModelProviderConfig) -> Self {
        let api_key = resolve_api_key(&config.id, config.api_key.as_deref());
        Self {
            base: HttpClientBase::new(config.id.clone(), config.endpoint.clone(), api_key),
            api_path: config
                .api_path
                .clone()
                .unwrap_or_else(|| "/v1/messages".to_string()),
        }
    }
}

#[async_trait]
impl ModelClient for AnthropicClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    fn verify(&self) -> Result<(), ModelError> {
        self.base.require_api_key().map(|_| ())
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let url = self.base.build_url(&self.api_path);

        let payload = AnthropicRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            system: request.system_prompt.clone(),
            messages: MessageAdapter::to_anthropic_format(&request.messages),
            tools: MessageAdapter::anthropic_tools(&request.tools),
        };

        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            messages = payload.messages.len(),
            tools = payload.tools.len(),
            "Sending request to Anthropic"
        );

        let response: AnthropicResponse = self
            .base
            .post_with_key_header(
                &url,
                "x-api-key",
                &[("anthropic-version", ANTHROPIC_VERSION)],
                &payload,
            )
            .await?;
        debug!(
            stop_reason = response.stop_reason.as_deref().unwrap_or("unknown"),
            blocks = response.content.len(),
            "Received response from Anthropic"
        );

        Ok(ModelResponse::new(json!({
            "role": "assistant",
            "content": response.content,
        })))
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<Value>,
    #[serde(default)]
    stop_reason: Option<String>,
}
