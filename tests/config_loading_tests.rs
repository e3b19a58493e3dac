// Config loading tests - testing AppConfig::load error handling
//
// Tests focused on configuration file loading and validation errors.

use mcp_agent_shell::config::{AppConfig, ConfigError};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("shell.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

#[test]
fn returns_error_when_file_not_found() {
    let result = AppConfig::load(Some(Path::new("/nonexistent/path/shell.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
fn returns_error_when_model_missing() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
default_provider = "anthropic"

[[providers]]
id = "anthropic"
endpoint = "https://api.anthropic.com"
"#,
    );

    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::MissingModel)));
}

#[test]
fn returns_error_when_default_provider_missing() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
model = "claude-3-opus-20240229"

[[providers]]
id = "anthropic"
endpoint = "https://api.anthropic.com"
"#,
    );

    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::MissingDefaultProvider)));
}

#[test]
fn returns_error_when_no_providers() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
default_provider = "anthropic"
model = "claude-3-opus-20240229"
"#,
    );

    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::NoProvidersConfigured)));
}

#[test]
fn loads_servers_with_session_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
default_provider = "anthropic"
model = "claude-3-opus-20240229"

[[providers]]
id = "anthropic"
type = "anthropic"
endpoint = "https://api.anthropic.com"
api_key = "ANTHROPIC_API_KEY"

[[servers]]
name = "files"
command = "file-server"
args = ["--root", "workspace"]

[[servers]]
name = "math"
command = "math-server"
"#,
    );

    let config = AppConfig::load(Some(&path)).expect("valid config");
    assert_eq!(config.servers.len(), 2);
    assert_eq!(config.servers[0].args, vec!["--root", "workspace"]);
    assert!(config.system_prompt.is_none());
    assert_eq!(config.session.max_steps, 8);
    assert_eq!(config.session.log_dir, Path::new("logs"));
}
