//! Application State

use std::sync::Arc;

use consult_core::{InferenceBackend, PromptRegistry, ToolRegistry};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Inference backend (Ollama, or a mock in tests)
    pub backend: Arc<dyn InferenceBackend>,

    /// Tool registry after whitelisting
    pub tools: Arc<ToolRegistry>,

    /// Prompt templates
    pub prompts: Arc<PromptRegistry>,
}
