use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    ToolResult,
    Other,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::ToolResult => "tool",
            Role::Other => "other",
        }
    }

    /// Maps the role spellings used by the supported model and agent formats.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" | "human" => Role::User,
            "assistant" | "ai" => Role::Assistant,
            "tool" | "tool_result" => Role::ToolResult,
            _ => Role::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    #[default]
    Success,
    Error,
}

impl ToolStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolStatus::Success => "success",
            ToolStatus::Error => "error",
        }
    }

    /// Anything that is not an explicit error counts as success.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "error" => ToolStatus::Error,
            _ => ToolStatus::Success,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text {
        text: String,
        is_thought: bool,
    },
    ToolUse {
        id: Option<String>,
        name: String,
        arguments: Vec<(String, Value)>,
    },
    ToolResult {
        tool_use_id: Option<String>,
        tool_name: String,
        status: ToolStatus,
        content: String,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text {
            text: text.into(),
            is_thought: false,
        }
    }

    pub fn thought(text: impl Into<String>) -> Self {
        ContentBlock::Text {
            text: text.into(),
            is_thought: true,
        }
    }
}

/// One normalized conversation entry. Content is always a block sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Turn {
    pub fn new(role: Role, content: Vec<ContentBlock>) -> Self {
        Self { role, content }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentBlock::text(text)])
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Non-empty, non-thought text blocks in order.
    pub fn answer_texts(&self) -> Vec<&str> {
        self.texts(false)
    }

    /// Non-empty thought text blocks in order.
    pub fn thought_texts(&self) -> Vec<&str> {
        self.texts(true)
    }

    fn texts(&self, thoughts: bool) -> Vec<&str> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text, is_thought }
                    if *is_thought == thoughts && !text.trim().is_empty() =>
                {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// Every text block joined with newlines, thoughts included.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn tool_uses(&self) -> impl Iterator<Item = (&Option<String>, &str, &[(String, Value)])> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::ToolUse {
                id,
                name,
                arguments,
            } => Some((id, name.as_str(), arguments.as_slice())),
            _ => None,
        })
    }
}

/// Conversation so far. Grows by append only for the lifetime of a session.
#[derive(Debug, Clone, Default)]
pub struct RunningHistory {
    turns: Vec<Turn>,
}

impl RunningHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
