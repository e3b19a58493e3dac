use super::turn::ToolStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordRole {
    User,
    Assistant,
    Tool,
}

/// Display-oriented projection of a turn, persisted in the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub role: RecordRole,
    pub content: String,
}

impl LogRecord {
    pub fn new(role: RecordRole, content: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(RecordRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(RecordRole::Assistant, content)
    }

    pub fn tool(name: &str, content: &str, status: ToolStatus) -> Self {
        Self::new(RecordRole::Tool, format_tool_entry(name, content, status))
    }
}

pub fn format_tool_entry(name: &str, content: &str, status: ToolStatus) -> String {
    format!("[{name}] {content} (Status: {})", status.as_str())
}
