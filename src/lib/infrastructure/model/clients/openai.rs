//! OpenAI-compatible client implementation

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

/// OpenAI-compatible client (OpenAI, Mistral, Groq, Ollama's `/v1` endpoint, etc.)
#[derive(Clone)]
pub struct OpenAIClient {
    base: HttpClientBase,
    api_path: String,
    requires_key: bool,
}

impl OpenAIClient {
    pub fn from_config(config: &ModelProviderConfig) -> Self {
        let requires_key = !config.is_ollama();
        let api_key = if requires_key {
            resolve_api_key(&config.id, config.api_key.as_deref())
        } else {
            None
        };
        Self {
            base: HttpClientBase::new(config.id.clone(), config.endpoint.clone(), api_key),
            api_path: config
                .api_path
                .clone()
                .unwrap_or_else(|| "/v1/chat/completions".to_string()),
            requires_key,
        }
    }
}

#[async_trait]
impl ModelClient for OpenAIClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    fn verify(&self) -> Result<(), ModelError> {
        if self.requires_key {
            self.base.require_api_key()?;
        }
        Ok(())
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let url = self.base.build_url(&self.api_path);

        let payload = OpenAIRequest {
            model: request.model.clone(),
            messages: MessageAdapter::to_openai_format(
                request.system_prompt.as_deref(),
                &request.messages,
            ),
            tools: MessageAdapter::openai_tools(&request.tools),
            max_tokens: request.max_tokens,
            stream: false,
        };

        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            messages = payload.messages.len(),
            tools = payload.tools.len(),
            "Sending request to OpenAI-compatible provider"
        );

        let response: OpenAIResponse = if self.requires_key {
            self.base.post_with_bearer(&url, &payload).await?
        } else {
            self.base.post_no_auth(&url, &payload).await?
        };
        debug!("Received response from OpenAI-compatible provider");

        let mut message = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .ok_or_else(|| ModelError::invalid_response(&self.base.id, "missing message"))?;
        let Value::Object(fields) = &mut message else {
            return Err(ModelError::invalid_response(
                &self.base.id,
                "message is not an object",
            ));
        };
        fields
            .entry("role")
            .or_insert_with(|| json!("assistant"));

        Ok(ModelResponse::new(message))
    }
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<Value>,
}
