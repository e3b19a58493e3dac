//! Conversation data model shared by the agent, the renderer and the session log.

pub mod record;
pub mod turn;

pub use record::{LogRecord, RecordRole};
pub use turn::{ContentBlock, Role, RunningHistory, ToolStatus, Turn};
