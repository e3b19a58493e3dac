use crate::infrastructure::model::ModelError;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("agent exceeded the limit of {limit} tool rounds")]
    StepLimit { limit: usize },
    /// Failure after one or more tool rounds already ran; `completed` holds
    /// the raw turns of those rounds.
    #[error("{source}")]
    Interrupted {
        completed: Vec<Value>,
        source: Box<AgentError>,
    },
}

impl AgentError {
    /// Attaches the turns produced before `source` occurred. Nothing is
    /// attached when no turn completed.
    pub fn interrupted(completed: Vec<Value>, source: AgentError) -> Self {
        if completed.is_empty() {
            source
        } else {
            AgentError::Interrupted {
                completed,
                source: Box::new(source),
            }
        }
    }

    /// Raw turns that finished before the failure.
    pub fn completed_turns(&self) -> &[Value] {
        match self {
            AgentError::Interrupted { completed, .. } => completed,
            _ => &[],
        }
    }

    /// The failure itself, without the attached turns.
    pub fn cause(&self) -> &AgentError {
        match self {
            AgentError::Interrupted { source, .. } => source.cause(),
            other => other,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            AgentError::Model(err) => err.user_message(),
            AgentError::StepLimit { limit } => format!(
                "The agent kept calling tools after {limit} rounds and was stopped. Try a more specific request."
            ),
            AgentError::Interrupted { source, .. } => source.user_message(),
        }
    }
}
