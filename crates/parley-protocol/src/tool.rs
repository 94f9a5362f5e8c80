use crate::error::AskError;

/// Errors returned by tools and tool adapters.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Tool received invalid arguments.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// Tool execution failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<AskError> for ToolError {
    fn from(err: AskError) -> Self {
        match err {
            AskError::InvalidBatch(message) => ToolError::InvalidArguments(message),
            other => ToolError::ExecutionFailed(other.to_string()),
        }
    }
}
