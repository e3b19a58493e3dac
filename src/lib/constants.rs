//! Application constants
//!
//! Single source of truth for paths, delimiters and other constants.

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/shell.toml";

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

/// Directory that receives one transcript file per session
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Output file of the one-shot mode
pub const DEFAULT_ONCE_OUTPUT: &str = "agent_output.json";

/// Opening and closing reasoning delimiters
pub const THOUGHT_OPEN: &str = "<thinking>";
pub const THOUGHT_CLOSE: &str = "</thinking>";

/// Delimiters around the final answer inside assistant text
pub const RESULT_OPEN: &str = "<result>";
pub const RESULT_CLOSE: &str = "</result>";

/// Inputs that end the interactive shell (compared case-insensitively)
pub const EXIT_COMMANDS: [&str; 2] = ["exit", "quit"];

/// Tool rounds allowed per agent invocation
pub const DEFAULT_MAX_STEPS: usize = 8;

/// Completion budget per model call
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

pub const DEFAULT_PROVIDER_ID: &str = "anthropic";
pub const DEFAULT_MODEL: &str = "claude-3-opus-20240229";
pub const DEFAULT_ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com";
pub const DEFAULT_ANTHROPIC_KEY_ENV: &str = "ANTHROPIC_API_KEY";

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a helpful assistant with access to tools.
Before answering, think step by step inside <thinking></thinking> tags.
Use the available tools whenever they help you answer accurately.
Wrap the final answer for the user inside <result></result> tags.";
