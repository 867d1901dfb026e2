//! Model Listing Tool

use std::sync::Arc;

use async_trait::async_trait;
use consult_core::{InferenceBackend, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

pub const TOOL_NAME: &str = "list_ollama_models";

/// `Available models: a, b` or `Error listing models: ...`
pub async fn list_models(backend: &dyn InferenceBackend) -> ToolResult {
    match backend.list_models().await {
        Ok(models) => {
            let names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
            ToolResult::success(TOOL_NAME, format!("Available models: {}", names.join(", ")))
        }
        Err(e) => ToolResult::failure(TOOL_NAME, format!("Error listing models: {e}")),
    }
}

pub struct ListModelsTool {
    backend: Arc<dyn InferenceBackend>,
}

impl ListModelsTool {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for ListModelsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "List all available Ollama models on the local instance.".into(),
            parameters: vec![],
            has_side_effects: false,
        }
    }

    async fn execute(&self, _call: &ToolCall) -> CoreResult<ToolResult> {
        Ok(list_models(self.backend.as_ref()).await)
    }
}
