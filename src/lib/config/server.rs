use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// A companion MCP server launched as a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
    pub command: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub workdir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawServer {
    name: String,
    command: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: HashMap<String, String>,
    workdir: Option<String>,
}

impl From<RawServer> for ServerConfig {
    fn from(raw: RawServer) -> Self {
        let expand = |s: &str| -> String {
            shellexpand::full(s)
                .map(|cow| cow.into_owned())
                .unwrap_or_else(|_| s.to_string())
        };

        Self {
            name: raw.name,
            command: PathBuf::from(expand(&raw.command)),
            args: raw.args.iter().map(|arg| expand(arg)).collect(),
            env: raw
                .env
                .into_iter()
                .map(|(key, value)| {
                    let value = expand(&value);
                    (key, value)
                })
                .collect(),
            workdir: raw.workdir.map(|dir| PathBuf::from(expand(&dir))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn expands_env_vars_in_command_args_and_env() {
        unsafe {
            env::set_var("SHELL_TEST_TOOLS", "/opt/tools");
            env::set_var("SHELL_TEST_ROOT", "sandbox");
        }

        let raw = RawServer {
            name: "files".to_string(),
            command: "${SHELL_TEST_TOOLS}/file-server".to_string(),
            args: vec!["--root".to_string(), "${SHELL_TEST_ROOT}".to_string()],
            env: HashMap::from([("ROOT".to_string(), "$SHELL_TEST_ROOT/x".to_string())]),
            workdir: Some("${SHELL_TEST_TOOLS}/work".to_string()),
        };

        let config = ServerConfig::from(raw);

        assert_eq!(config.command, PathBuf::from("/opt/tools/file-server"));
        assert_eq!(config.args, vec!["--root", "sandbox"]);
        assert_eq!(config.env.get("ROOT").map(String::as_str), Some("sandbox/x"));
        assert_eq!(config.workdir, Some(PathBuf::from("/opt/tools/work")));

        unsafe {
            env::remove_var("SHELL_TEST_TOOLS");
            env::remove_var("SHELL_TEST_ROOT");
        }
    }

    #[test]
    #[serial]
    fn unknown_variables_leave_text_untouched() {
        let raw = RawServer {
            name: "math".to_string(),
            command: "${SHELL_TEST_DEFINITELY_UNSET}/math-server".to_string(),
            args: Vec::new(),
            env: HashMap::new(),
            workdir: None,
        };
        let config = ServerConfig::from(raw);
        assert_eq!(
            config.command,
            PathBuf::from("${SHELL_TEST_DEFINITELY_UNSET}/math-server")
        );
    }
}
