//! # Provider Configuration
//!
//! | Type | Description | API Key Required |
//! |------|-------------|-----------------|
//! | `anthropic` | Anthropic Messages API | Yes |
//! | `openai` | OpenAI-compatible chat completions | Yes |
//! | `ollama` | Local Ollama server (OpenAI-compatible endpoint) | No |

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelInfo {
    /// Model identifier used in API calls
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Connection to one model service.
///
/// ```toml
/// [[providers]]
/// id = "anthropic"
/// type = "anthropic"
/// endpoint = "https://api.anthropic.com"
/// api_key = "ANTHROPIC_API_KEY"
/// models = ["claude-3-opus-20240229"]
/// ```
///
/// `api_key` names the environment variable holding the key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelProviderConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub provider_type: String,
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_path: Option<String>,
    pub models: Vec<ModelInfo>,
}

impl ModelProviderConfig {
    pub fn is_anthropic(&self) -> bool {
        self.provider_type.eq_ignore_ascii_case("anthropic")
    }

    pub fn is_ollama(&self) -> bool {
        matches!(
            self.provider_type.to_ascii_lowercase().as_str(),
            "ollama" | "localai"
        )
    }

    /// Registers `model` so the router accepts it, unless the list is open.
    pub fn ensure_model(&mut self, model: &str) {
        if self.models.is_empty() || self.models.iter().any(|m| m.name == model) {
            return;
        }
        self.models.push(ModelInfo {
            name: model.to_string(),
            display_name: None,
        });
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawProviderConfig {
    pub(super) id: String,
    #[serde(rename = "type", default)]
    pub(super) provider_type: String,
    pub(super) endpoint: Option<String>,
    pub(super) api_key: Option<String>,
    #[serde(default)]
    pub(super) api_path: Option<String>,
    #[serde(default)]
    pub(super) models: Vec<RawModelInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum RawModelInfo {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        display_name: Option<String>,
    },
}

impl From<RawModelInfo> for ModelInfo {
    fn from(value: RawModelInfo) -> Self {
        match value {
            RawModelInfo::Name(name) => Self {
                name,
                display_name: None,
            },
            RawModelInfo::Detailed { name, display_name } => Self { name, display_name },
        }
    }
}

impl From<RawProviderConfig> for ModelProviderConfig {
    fn from(raw: RawProviderConfig) -> Self {
        let provider_type = if raw.provider_type.trim().is_empty() {
            raw.id.clone()
        } else {
            raw.provider_type
        };
        Self {
            id: raw.id,
            provider_type,
            endpoint: raw.endpoint.unwrap_or_default(),
            api_key: raw.api_key,
            api_path: raw.api_path,
            models: raw.models.into_iter().map(ModelInfo::from).collect(),
        }
    }
}
