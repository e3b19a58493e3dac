pub mod application;
pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, once, shell, tooling, transcript};
pub use cli::{Cli, RunMode};
pub use config::{AppConfig, ConfigError, ModelProviderConfig};
pub use infrastructure::model;

use agent::{AgentOptions, ToolCallingAgent};
use chrono::Local;
use infrastructure::model::DynamicModelProvider;
use shell::SessionShell;
use std::error::Error;
use std::io::{self, IsTerminal};
use std::sync::Arc;
use tokio::io::BufReader;
use tooling::{ServerManager, ToolProvider};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use transcript::{ConsoleRenderer, SessionLog};

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    init_tracing();
    info!("Starting agent shell");
    debug!(
        mode = ?cli.mode,
        config = ?cli.config,
        provider = ?cli.provider,
        model = ?cli.model,
        "CLI arguments parsed"
    );

    let mut config = AppConfig::load(cli.config.as_deref())?;
    apply_cli_overrides(&cli, &mut config)?;
    info!(
        provider = config.default_provider.as_str(),
        model = config.model.as_str(),
        servers = config.servers.len(),
        "Configuration ready"
    );

    let provider = DynamicModelProvider::from_configs(&config.providers)?;
    provider.verify(&config.default_provider, &config.model)?;

    let tools = Arc::new(ServerManager::connect(config.servers.clone()).await?);
    let result = run_session(&cli, &config, provider, tools.clone()).await;
    tools.shutdown().await;

    info!("Agent shell finished");
    result
}

async fn run_session(
    cli: &Cli,
    config: &AppConfig,
    provider: DynamicModelProvider,
    tools: Arc<ServerManager>,
) -> Result<(), Box<dyn Error>> {
    let catalog = tools.catalog().await;
    let options = AgentOptions::new(config.default_provider.clone(), config.model.clone())
        .with_system_prompt(config.system_prompt.clone())
        .with_max_steps(config.session.max_steps)
        .with_max_tokens(config.session.max_tokens);
    let agent = ToolCallingAgent::new(Arc::new(provider), tools, options);

    match cli.mode {
        RunMode::Shell => {
            let styled = !cli.no_color && io::stdout().is_terminal();
            let renderer = ConsoleRenderer::new(io::stdout(), styled);
            let log = SessionLog::start(&config.session.log_dir, Local::now());
            let mut shell = SessionShell::new(agent, catalog, renderer, log);
            shell.run(BufReader::new(tokio::io::stdin())).await?;
        }
        RunMode::Once => {
            let prompt = cli.prompt.join(" ");
            once::run_once(&agent, &catalog, &prompt, &cli.output, &mut io::stdout()).await?;
        }
    }
    Ok(())
}

/// Logs go to stderr; `RUST_LOG` overrides the quiet default.
fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .with_level(true)
            .init();
    });
}

fn apply_cli_overrides(cli: &Cli, config: &mut AppConfig) -> Result<(), ConfigError> {
    if let Some(provider) = cli.provider.as_deref() {
        if config.provider(provider).is_none() {
            return Err(ConfigError::ProviderNotFound {
                provider: provider.to_string(),
            });
        }
        info!(provider, "Overriding default provider based on CLI flag");
        config.default_provider = provider.to_string();
    }
    if let Some(model) = cli.model.as_deref() {
        info!(model, "Overriding model based on CLI flag");
        config.model = model.to_string();
    }
    if let Some(system) = cli.system.clone() {
        config.system_prompt = Some(system);
    }
    if let Some(log_dir) = cli.log_dir.clone() {
        config.session.log_dir = log_dir;
    }

    let default_provider = config.default_provider.clone();
    let model = config.model.clone();
    match config
        .providers
        .iter_mut()
        .find(|provider| provider.id == default_provider)
    {
        Some(provider) => provider.ensure_model(&model),
        None => warn!(
            provider = default_provider.as_str(),
            "Default provider missing after overrides"
        ),
    }
    Ok(())
}
