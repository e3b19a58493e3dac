use super::error::ConfigError;
use super::provider::{ModelInfo, ModelProviderConfig};
use super::server::ServerConfig;
use crate::constants::{
    DEFAULT_ANTHROPIC_ENDPOINT, DEFAULT_ANTHROPIC_KEY_ENV, DEFAULT_LOG_DIR, DEFAULT_MAX_STEPS,
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_PROVIDER_ID, DEFAULT_SYSTEM_PROMPT,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Session configuration, built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_provider: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub providers: Vec<ModelProviderConfig>,
    pub servers: Vec<ServerConfig>,
    pub session: SessionSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub log_dir: PathBuf,
    pub max_steps: usize,
    pub max_tokens: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            max_steps: DEFAULT_MAX_STEPS,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl AppConfig {
    /// Load configuration from a file path (or the default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    /// Anthropic model plus the bundled file and math servers.
    pub fn builtin() -> Self {
        Self {
            default_provider: DEFAULT_PROVIDER_ID.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            providers: vec![ModelProviderConfig {
                id: DEFAULT_PROVIDER_ID.to_string(),
                provider_type: "anthropic".to_string(),
                endpoint: DEFAULT_ANTHROPIC_ENDPOINT.to_string(),
                api_key: Some(DEFAULT_ANTHROPIC_KEY_ENV.to_string()),
                api_path: None,
                models: vec![ModelInfo {
                    name: DEFAULT_MODEL.to_string(),
                    display_name: None,
                }],
            }],
            servers: vec![
                ServerConfig {
                    name: "files".to_string(),
                    command: companion_command("file-server"),
                    args: vec!["--root".to_string(), "workspace".to_string()],
                    env: HashMap::new(),
                    workdir: None,
                },
                ServerConfig {
                    name: "math".to_string(),
                    command: companion_command("math-server"),
                    args: Vec::new(),
                    env: HashMap::new(),
                    workdir: None,
                },
            ],
            session: SessionSettings::default(),
        }
    }

    pub fn provider(&self, id: &str) -> Option<&ModelProviderConfig> {
        self.providers.iter().find(|provider| provider.id == id)
    }
}

/// Prefers a binary installed next to the running executable, else `PATH`.
fn companion_command(name: &str) -> PathBuf {
    let file_name = format!("{name}{}", std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&file_name)))
        .filter(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(file_name))
}
