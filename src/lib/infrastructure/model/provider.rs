//! Dynamic model provider with multiple backends

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use super::factory::ProviderFactory;
use super::traits::{ModelClient, ModelProvider};
use super::types::{ModelError, ModelRequest, ModelResponse};
use crate::config::ModelProviderConfig;

/// Runtime container for a provider backend
struct ProviderRuntime {
    models: HashSet<String>,
    client: Box<dyn ModelClient>,
}

impl ProviderRuntime {
    fn supports(&self, model: &str) -> bool {
        self.models.is_empty() || self.models.contains(model)
    }
}

/// Dynamic model provider that routes requests to appropriate backends
#[derive(Default)]
pub struct DynamicModelProvider {
    backends: HashMap<String, ProviderRuntime>,
}

impl DynamicModelProvider {
    /// Create provider from config list using factory
    pub fn from_configs(configs: &[ModelProviderConfig]) -> Result<Self, ModelError> {
        let mut backends = HashMap::new();

        for config in configs {
            let models: HashSet<String> = config.models.iter().map(|m| m.name.clone()).collect();

            let client = ProviderFactory::create(config);

            backends.insert(config.id.clone(), ProviderRuntime { models, client });
        }

        Ok(Self { backends })
    }

    /// Fails fast when the provider is unknown, lacks credentials or does not offer `model`.
    pub fn verify(&self, provider: &str, model: &str) -> Result<(), ModelError> {
        let runtime = self
            .backends
            .get(provider)
            .ok_or_else(|| ModelError::provider_not_found(provider))?;
        if !runtime.supports(model) {
            return Err(ModelError::model_not_found(provider, model));
        }
        runtime.client.verify()
    }
}

#[async_trait]
impl ModelProvider for DynamicModelProvider {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let provider_id = &request.provider;

        let runtime = self
            .backends
            .get(provider_id)
            .ok_or_else(|| ModelError::provider_not_found(provider_id))?;

        if !runtime.supports(&request.model) {
            return Err(ModelError::model_not_found(provider_id, &request.model));
        }

        runtime.client.chat(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelInfo;

    fn ollama(models: &[&str]) -> ModelProviderConfig {
        ModelProviderConfig {
            id: "local".into(),
            provider_type: "ollama".into(),
            endpoint: "http://127.0.0.1:9".into(),
            api_key: None,
            api_path: None,
            models: models
                .iter()
                .map(|name| ModelInfo {
                    name: name.to_string(),
                    display_name: None,
                })
                .collect(),
        }
    }

    #[test]
    fn verify_checks_provider_and_model() {
        let provider = DynamicModelProvider::from_configs(&[ollama(&["llama3.1"])]).unwrap();
        assert!(provider.verify("local", "llama3.1").is_ok());
        assert!(matches!(
            provider.verify("local", "other"),
            Err(ModelError::ModelNotFound { .. })
        ));
        assert!(matches!(
            provider.verify("missing", "llama3.1"),
            Err(ModelError::ProviderNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn chat_rejects_unknown_provider_before_network() {
        let provider = DynamicModelProvider::default();
        let request = ModelRequest {
            provider: "nope".into(),
            model: "m".into(),
            system_prompt: None,
            messages: Vec::new(),
            tools: Vec::new(),
            max_tokens: 16,
        };
        let err = provider.chat(request).await.unwrap_err();
        assert!(matches!(err, ModelError::ProviderNotFound { .. }));
    }
}
