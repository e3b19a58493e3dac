use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("failed to write session log {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read session log {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("session log {path:?} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl TranscriptError {
    pub fn user_message(&self) -> String {
        match self {
            TranscriptError::Io { path, .. } => format!(
                "Could not save the session log to {}. The session continues in memory.",
                path.display()
            ),
            TranscriptError::Read { path, .. } | TranscriptError::Json { path, .. } => {
                format!("Could not load the session log {}.", path.display())
            }
        }
    }
}
