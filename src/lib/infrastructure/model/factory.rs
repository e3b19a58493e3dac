//! Provider factory - creates clients from config

use super::clients::{AnthropicClient, OpenAIClient};
use super::traits::ModelClient;
use crate::config::ModelProviderConfig;
use std::env;
use tracing::warn;

/// Resolve API key from environment variable
pub fn resolve_api_key(provider: &str, spec: Option<&str>) -> Option<String> {
    let raw = spec.map(str::trim)?;
    if raw.is_empty() {
        return None;
    }
    match env::var(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                provider,
                env_var = raw,
                %err,
                "API key environment variable is not set"
            );
            None
        }
    }
}

/// Factory for creating model clients from provider config.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Creates a model client based on provider type.
    ///
    /// Supported types:
    /// - `anthropic`, `claude` → Anthropic Messages API
    /// - Others → OpenAI-compatible format (default); `ollama` skips auth
    pub fn create(config: &ModelProviderConfig) -> Box<dyn ModelClient> {
        match config.provider_type.to_lowercase().as_str() {
            "anthropic" | "claude" => Box::new(AnthropicClient::from_config(config)),
            _ => Box::new(OpenAIClient::from_config(config)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn config(provider_type: &str, key_env: Option<&str>) -> ModelProviderConfig {
        ModelProviderConfig {
            id: provider_type.to_string(),
            provider_type: provider_type.to_string(),
            endpoint: "http://127.0.0.1:9".to_string(),
            api_key: key_env.map(String::from),
            api_path: None,
            models: Vec::new(),
        }
    }

    #[test]
    #[serial]
    fn resolves_key_from_named_variable() {
        unsafe {
            env::set_var("SHELL_TEST_MODEL_KEY", "secret");
        }
        assert_eq!(
            resolve_api_key("p", Some(" SHELL_TEST_MODEL_KEY ")).as_deref(),
            Some("secret")
        );
        assert_eq!(resolve_api_key("p", Some("")), None);
        assert_eq!(resolve_api_key("p", None), None);
        unsafe {
            env::remove_var("SHELL_TEST_MODEL_KEY");
        }
    }

    #[test]
    #[serial]
    fn anthropic_without_key_fails_verification() {
        let client = ProviderFactory::create(&config("anthropic", Some("SHELL_TEST_UNSET_KEY")));
        assert!(client.verify().is_err());
    }

    #[test]
    fn ollama_needs_no_key() {
        let client = ProviderFactory::create(&config("ollama", None));
        assert_eq!(client.id(), "ollama");
        assert!(client.verify().is_ok());
    }
}
