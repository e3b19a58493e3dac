use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::constants::DEFAULT_ONCE_OUTPUT;

#[derive(Parser, Debug)]
#[command(
    name = "agent-shell",
    version,
    about = "Interactive shell for a tool-using agent backed by MCP servers"
)]
pub struct Cli {
    /// Configuration file (defaults to config/shell.toml, then built-in settings)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Provider id overriding `default_provider`
    #[arg(long)]
    pub provider: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub system: Option<String>,
    /// Directory receiving the session transcript
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
    #[arg(long, short, value_enum, default_value_t = RunMode::Shell)]
    pub mode: RunMode,
    /// File written by once mode
    #[arg(long, default_value = DEFAULT_ONCE_OUTPUT)]
    pub output: PathBuf,
    /// Disable colored console output
    #[arg(long)]
    pub no_color: bool,
    /// Prompt for once mode
    pub prompt: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RunMode {
    /// Interactive chat on stdin/stdout
    Shell,
    /// Run a single prompt and save the conversation as JSON
    Once,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_shell_mode() {
        let cli = Cli::parse_from(["agent-shell"]);
        assert_eq!(cli.mode, RunMode::Shell);
        assert_eq!(cli.output, PathBuf::from(DEFAULT_ONCE_OUTPUT));
        assert!(cli.prompt.is_empty());
    }

    #[test]
    fn once_mode_collects_trailing_prompt() {
        let cli = Cli::parse_from([
            "agent-shell",
            "--mode",
            "once",
            "--model",
            "claude-3-haiku",
            "what's",
            "(3 + 5) x 12?",
        ]);
        assert_eq!(cli.mode, RunMode::Once);
        assert_eq!(cli.model.as_deref(), Some("claude-3-haiku"));
        assert_eq!(cli.prompt.join(" "), "what's (3 + 5) x 12?");
    }
}
