//! Error Types

use thiserror::Error;

/// Result type alias for consult operations
pub type Result<T> = std::result::Result<T, ConsultError>;

/// Consult error types
#[derive(Error, Debug)]
pub enum ConsultError {
    /// Inference backend failed (transport, non-2xx status, malformed body)
    #[error("Ollama request failed: {0}")]
    Backend(String),

    /// Inputs rejected before any backend call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Memory record could not be written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool arguments failed validation
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Prompt template not found in registry
    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    /// Prompt arguments failed validation
    #[error("Prompt validation error: {0}")]
    PromptValidation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl ConsultError {
    /// Errors caused by the caller's arguments rather than the backend or disk
    pub const fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::ToolNotFound(_)
                | Self::ToolValidation(_)
                | Self::PromptNotFound(_)
                | Self::PromptValidation(_)
        )
    }

    /// The bare cause, without the variant prefix.
    ///
    /// Backend failures keep their prefix so that tool output reads
    /// `Error consulting Ollama: Ollama request failed: ...`.
    pub fn cause(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::Persistence(msg)
            | Self::ToolValidation(msg)
            | Self::PromptValidation(msg)
            | Self::Config(msg)
            | Self::Other(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<anyhow::Error> for ConsultError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
