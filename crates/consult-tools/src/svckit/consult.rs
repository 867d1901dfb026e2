//! Single Consultation Tool
//!
//! Sends one prompt to one model and returns its text.

use std::sync::Arc;

use async_trait::async_trait;
use consult_core::{
    tool::ParameterSchema, ConsultRequest, InferenceBackend, Result as CoreResult, Tool, ToolCall,
    ToolResult, ToolSchema,
};

pub const TOOL_NAME: &str = "consult_ollama";

/// Consult one model. Backend failures become an `Error consulting Ollama: ...`
/// result instead of an error.
pub async fn consult(backend: &dyn InferenceBackend, request: &ConsultRequest) -> ToolResult {
    match backend.generate(request).await {
        Ok(response) => ToolResult::success(TOOL_NAME, response),
        Err(e) => {
            tracing::warn!(model = %request.model, error = %e, "consultation failed");
            ToolResult::failure(TOOL_NAME, format!("Error consulting Ollama: {e}"))
        }
    }
}

/// Tool wrapper around [`consult`]
pub struct ConsultTool {
    backend: Arc<dyn InferenceBackend>,
}

impl ConsultTool {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for ConsultTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Consult an Ollama model with a prompt and get its response for reasoning from another viewpoint.".into(),
            parameters: vec![
                ParameterSchema::string("model", "The Ollama model to use", true),
                ParameterSchema::string("prompt", "The prompt to send to the model", true),
                ParameterSchema::string("system_prompt", "Optional system prompt to set context", false),
            ],
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let request = ConsultRequest::new(call.required_str("model")?, call.required_str("prompt")?)
            .with_system_prompt(call.optional_str("system_prompt")?);

        Ok(consult(self.backend.as_ref(), &request).await)
    }
}
