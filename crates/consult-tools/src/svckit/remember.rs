//! Remember Tool
//!
//! Stores a consultation in the memory directory, generating the response
//! first when only a model is given.

use std::sync::Arc;

use async_trait::async_trait;
use consult_core::{
    tool::ParameterSchema, ConsultRequest, InferenceBackend, Result as CoreResult, Tool, ToolCall,
    ToolResult, ToolSchema,
};

use crate::memory::MemoryStore;
use crate::model::MemoryRecord;

pub const TOOL_NAME: &str = "remember_consult";

/// Inputs for [`remember`]
#[derive(Clone, Debug, Default)]
pub struct RememberRequest {
    pub prompt: String,
    pub key: Option<String>,
    pub model: Option<String>,
    pub response: Option<String>,
}

impl RememberRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }
}

/// Resolve the response, then persist the record.
///
/// Returns `Saved consult to <path>` or a descriptive failure string; storage
/// is never touched when there is nothing to store.
pub async fn remember(
    backend: &dyn InferenceBackend,
    store: &MemoryStore,
    request: &RememberRequest,
) -> ToolResult {
    let model = request.model.as_deref().filter(|m| !m.is_empty());
    let provided = request.response.as_deref().filter(|r| !r.is_empty());

    let response = match (provided, model) {
        (Some(response), _) => response.to_string(),
        (None, Some(model)) => {
            let consult = ConsultRequest::new(model, request.prompt.as_str());
            match backend.generate(&consult).await {
                Ok(response) => response,
                Err(e) => {
                    return ToolResult::failure(
                        TOOL_NAME,
                        format!("Failed to generate response: {e}"),
                    );
                }
            }
        }
        (None, None) => {
            return ToolResult::failure(
                TOOL_NAME,
                "Error: Missing 'response' and no 'model' provided to generate it.",
            );
        }
    };

    let record = MemoryRecord::new(request.prompt.as_str(), response)
        .with_key(request.key.clone())
        .with_model(model);

    match store.save(&record).await {
        Ok(path) => ToolResult::success(TOOL_NAME, format!("Saved consult to {}", path.display())),
        Err(e) => {
            tracing::error!(dir = %store.dir().display(), error = %e, "failed to save memory");
            ToolResult::failure(TOOL_NAME, format!("Failed to save memory: {e}"))
        }
    }
}

pub struct RememberTool {
    backend: Arc<dyn InferenceBackend>,
    store: MemoryStore,
}

impl RememberTool {
    pub fn new(backend: Arc<dyn InferenceBackend>, store: MemoryStore) -> Self {
        Self { backend, store }
    }
}

#[async_trait]
impl Tool for RememberTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Store the result of a consult into a local memory store.".into(),
            parameters: vec![
                ParameterSchema::string("prompt", "The prompt that was used", true),
                ParameterSchema::string("key", "Optional key for the memory entry", false),
                ParameterSchema::string("model", "Optional model name that was used", false),
                ParameterSchema::string(
                    "response",
                    "The response to store. If not provided, will generate one using the model",
                    false,
                ),
            ],
            has_side_effects: true,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let request = RememberRequest {
            prompt: call.required_str("prompt")?.to_string(),
            key: call.optional_str("key")?.map(str::to_string),
            model: call.optional_str("model")?.map(str::to_string),
            response: call.optional_str("response")?.map(str::to_string),
        };

        Ok(remember(self.backend.as_ref(), &self.store, &request).await)
    }
}
