//! One-shot mode: a single prompt, its conversation saved as JSON.

use super::agent::AgentRuntime;
use super::shell::ShellError;
use super::tooling::ToolCatalog;
use crate::application::transcript::normalize_turn;
use crate::domain::Turn;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// One message of the saved conversation; `content` keeps the raw shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnceMessage {
    pub role: String,
    pub content: Value,
}

impl OnceMessage {
    fn from_raw(raw: &Value) -> Self {
        let role = normalize_turn(raw).role.as_str().to_string();
        let content = match raw {
            Value::Object(map) => map.get("content").cloned().unwrap_or(Value::Null),
            other => other.clone(),
        };
        Self { role, content }
    }
}

/// Runs `prompt` once, writes the conversation to `output` and echoes it to `out`.
pub async fn run_once<A, W>(
    agent: &A,
    catalog: &ToolCatalog,
    prompt: &str,
    output: &Path,
    out: &mut W,
) -> Result<Vec<OnceMessage>, ShellError>
where
    A: AgentRuntime + ?Sized,
    W: Write,
{
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(ShellError::MissingPrompt);
    }

    info!(tools = catalog.len(), "Running single prompt");
    let raw = agent.invoke(&[Turn::user(prompt)], catalog).await?;

    let mut messages = Vec::with_capacity(raw.len() + 1);
    messages.push(OnceMessage {
        role: "user".to_string(),
        content: Value::String(prompt.to_string()),
    });
    messages.extend(raw.iter().map(OnceMessage::from_raw));

    let formatted = serde_json::to_string_pretty(&messages)?;
    fs::write(output, &formatted).map_err(|source| ShellError::Output {
        path: output.to_path_buf(),
        source,
    })?;
    info!(path = %output.display(), messages = messages.len(), "Agent output saved");

    writeln!(out, "Agent response saved to {}:\n", output.display())?;
    writeln!(out, "{formatted}")?;
    out.flush()?;
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::agent::AgentError;
    use async_trait::async_trait;
    use serde_json::json;

    struct Canned(Vec<Value>);

    #[async_trait]
    impl AgentRuntime for Canned {
        async fn invoke(
            &self,
            history: &[Turn],
            _catalog: &ToolCatalog,
        ) -> Result<Vec<Value>, AgentError> {
            assert_eq!(history.len(), 1);
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn saves_conversation_with_literal_non_ascii() {
        let dir = tempfile::tempdir().expect("temp dir");
        let output = dir.path().join("agent_output.json");
        let agent = Canned(vec![
            json!({"role": "assistant", "content": [{"type": "tool_use", "id": "t", "name": "add", "input": {"a": 3, "b": 5}}]}),
            json!({"type": "tool", "name": "add", "tool_call_id": "t", "content": "8", "status": "success"}),
            json!({"role": "assistant", "content": "Résultat: 96"}),
        ]);
        let mut console = Vec::new();

        let messages = run_once(
            &agent,
            &ToolCatalog::default(),
            "what's (3 + 5) x 12?",
            &output,
            &mut console,
        )
        .await
        .expect("once run succeeds");

        let roles: Vec<_> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "assistant", "tool", "assistant"]);

        let saved = fs::read_to_string(&output).expect("output written");
        assert!(saved.contains("Résultat: 96"));
        let parsed: Value = serde_json::from_str(&saved).expect("valid json");
        assert_eq!(parsed[1]["content"][0]["name"], "add");

        let printed = String::from_utf8(console).expect("utf8");
        assert!(printed.starts_with("Agent response saved to"));
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = run_once(
            &Canned(Vec::new()),
            &ToolCatalog::default(),
            "   ",
            &dir.path().join("out.json"),
            &mut Vec::new(),
        )
        .await
        .expect_err("blank prompt");
        assert!(matches!(err, ShellError::MissingPrompt));
    }
}
