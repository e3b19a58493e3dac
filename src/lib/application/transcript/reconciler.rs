use super::session_log::SessionLog;
use crate::domain::{ContentBlock, LogRecord, Role, RunningHistory, Turn};
use tracing::debug;

/// Folds the turns produced by one agent invocation into the running history
/// and the session log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReconciler;

impl LogReconciler {
    /// Returns the number of log records appended.
    pub fn reconcile(
        &self,
        history: &mut RunningHistory,
        log: &mut SessionLog,
        delta: &[Turn],
    ) -> usize {
        let before = log.records().len();

        for turn in delta {
            match turn.role {
                Role::Assistant => {
                    let texts = turn.answer_texts();
                    if !texts.is_empty() {
                        log.push(LogRecord::assistant(texts.join("\n")));
                    }
                    history.push(turn.clone());
                }
                Role::ToolResult => {
                    for block in &turn.content {
                        if let ContentBlock::ToolResult {
                            tool_name,
                            status,
                            content,
                            ..
                        } = block
                        {
                            log.push(LogRecord::tool(tool_name, content, *status));
                        }
                    }
                    history.push(turn.clone());
                }
                Role::User | Role::Other => {
                    debug!(role = turn.role.as_str(), "Skipping turn during reconciliation");
                }
            }
        }

        log.records().len() - before
    }
}
