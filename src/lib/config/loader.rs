use super::app::{AppConfig, SessionSettings};
use super::error::ConfigError;
use super::provider::{ModelProviderConfig, RawProviderConfig};
use super::server::{RawServer, ServerConfig};
use crate::constants::{CONFIG_PATH, ENV_PATH};
use dotenvy::{dotenv, from_filename};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, info, warn};

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    model: Option<String>,
    default_provider: Option<String>,
    system_prompt: Option<String>,
    #[serde(default)]
    session: RawSession,
    #[serde(default)]
    servers: Vec<RawServer>,
    #[serde(default)]
    providers: Vec<RawProviderConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct RawSession {
    log_dir: Option<String>,
    max_steps: Option<usize>,
    max_tokens: Option<u32>,
}

/// Loads `config/.env`, then `.env`, once per process. Existing variables win.
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        if from_filename(ENV_PATH).is_ok() {
            debug!(path = ENV_PATH, "Loaded environment file");
        }
        if let Ok(path) = dotenv() {
            debug!(path = %path.display(), "Loaded environment file");
        }
    });
}

/// An explicit path must exist. Without one, the default path is tried and
/// the built-in configuration is used when it is absent.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    match path {
        Some(path) => read_config(path),
        None => {
            let default_path = Path::new(CONFIG_PATH);
            if default_path.exists() {
                read_config(default_path)
            } else {
                info!(
                    path = CONFIG_PATH,
                    "No configuration file found; using built-in configuration"
                );
                Ok(AppConfig::builtin())
            }
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading shell configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let parsed: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_and_build(parsed)
}

fn validate_and_build(parsed: RawConfig) -> Result<AppConfig, ConfigError> {
    let model = parsed.model.ok_or(ConfigError::MissingModel)?;
    let default_provider = parsed
        .default_provider
        .ok_or(ConfigError::MissingDefaultProvider)?;

    if parsed.providers.is_empty() {
        return Err(ConfigError::NoProvidersConfigured);
    }

    let mut providers: Vec<ModelProviderConfig> = Vec::new();
    for raw_provider in parsed.providers {
        if raw_provider.endpoint.is_none() {
            return Err(ConfigError::MissingEndpoint {
                provider: raw_provider.id.clone(),
            });
        }
        providers.push(ModelProviderConfig::from(raw_provider));
    }
    let Some(provider) = providers.iter_mut().find(|p| p.id == default_provider) else {
        return Err(ConfigError::ProviderNotFound {
            provider: default_provider,
        });
    };
    provider.ensure_model(&model);

    let defaults = SessionSettings::default();
    let session = SessionSettings {
        log_dir: parsed
            .session
            .log_dir
            .map(PathBuf::from)
            .unwrap_or(defaults.log_dir),
        max_steps: parsed.session.max_steps.unwrap_or(defaults.max_steps),
        max_tokens: parsed.session.max_tokens.unwrap_or(defaults.max_tokens),
    };
    if session.max_steps == 0 {
        return Err(ConfigError::InvalidMaxSteps);
    }

    if parsed.servers.is_empty() {
        warn!("No MCP servers configured; the agent will run without tools");
    }

    Ok(AppConfig {
        default_provider,
        model,
        system_prompt: parsed.system_prompt,
        providers,
        servers: parsed.servers.into_iter().map(ServerConfig::from).collect(),
        session,
    })
}
