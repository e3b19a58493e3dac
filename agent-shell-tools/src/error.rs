use std::io;
use thiserror::Error;

/// Failure of a single tool call, reported to the client as an `isError` result.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unsupported extension: {extension}. Allowed: {allowed}")]
    UnsupportedExtension { extension: String, allowed: String },
    #[error("Only {allowed} files are allowed.")]
    DisallowedFile { allowed: String },
    #[error("Invalid file name: {filename}")]
    InvalidFileName { filename: String },
    #[error("File not found: {filename}")]
    NotFound { filename: String },
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Arithmetic overflow in {operation}")]
    Overflow { operation: String },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ToolError {
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
