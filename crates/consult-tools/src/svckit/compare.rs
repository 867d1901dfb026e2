//! Model Comparison Tool
//!
//! Runs one prompt against several models, strictly one after another, and
//! reports every model's outcome. A failing model never stops the batch.

use std::sync::Arc;

use async_trait::async_trait;
use consult_core::{
    tool::ParameterSchema, ConsultError, ConsultRequest, InferenceBackend, Result as CoreResult,
    Tool, ToolCall, ToolResult, ToolSchema,
};

use crate::model::{ComparisonResult, ConsultOutcome, ConsultResult};

pub const TOOL_NAME: &str = "compare_ollama_models";

/// How many installed models are picked when the caller names none
const AUTO_SELECT_COUNT: usize = 2;

const SUMMARY_HEADER: &str = "\n\n--- Text Summary ---\n\n";
const SUMMARY_SEPARATOR: &str = "\n\n---\n\n";

/// Inputs for a comparison run
#[derive(Clone, Debug, Default)]
pub struct CompareRequest {
    pub prompt: String,
    /// Models to consult; `None` or empty means auto-select
    pub models: Option<Vec<String>>,
    pub system_prompt: Option<String>,
}

impl CompareRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = Some(models.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

/// Trim names, drop blanks, drop repeats (first occurrence wins)
fn normalize_models(models: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(models.len());
    for name in models.iter().map(|m| m.trim()).filter(|m| !m.is_empty()) {
        if !seen.iter().any(|s: &String| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

/// Pick the first installed models, or the fallback when listing fails
async fn select_models(backend: &dyn InferenceBackend, fallback_model: &str) -> Vec<String> {
    match backend.list_models().await {
        Ok(models) => models
            .into_iter()
            .take(AUTO_SELECT_COUNT)
            .map(|m| m.name)
            .collect(),
        Err(e) => {
            tracing::warn!(
                error = %e,
                fallback = fallback_model,
                "model listing failed, comparing against the default model"
            );
            vec![fallback_model.to_string()]
        }
    }
}

/// Consult every selected model in order and collect the outcomes.
///
/// Fails only with [`ConsultError::Validation`] when no model could be
/// selected; in that case no generation call is made.
pub async fn run_comparison(
    backend: &dyn InferenceBackend,
    request: &CompareRequest,
    fallback_model: &str,
) -> CoreResult<ComparisonResult> {
    let requested = request
        .models
        .as_deref()
        .map(normalize_models)
        .unwrap_or_default();

    let models = if requested.is_empty() {
        select_models(backend, fallback_model).await
    } else {
        requested
    };

    if models.is_empty() {
        return Err(ConsultError::Validation("No models available".into()));
    }

    let system_prompt = request.system_prompt.clone().filter(|s| !s.is_empty());
    let mut entries = Vec::with_capacity(models.len());

    for model in models {
        let consult = ConsultRequest::new(model.as_str(), request.prompt.as_str())
            .with_system_prompt(system_prompt.as_deref());

        let result = match backend.generate(&consult).await {
            Ok(response) => ConsultResult::success(response),
            Err(e) => {
                tracing::warn!(model = %model, error = %e, "model failed during comparison");
                ConsultResult::failure(e.to_string())
            }
        };
        entries.push((model, result));
    }

    Ok(ComparisonResult::new(request.prompt.as_str(), system_prompt, entries))
}

/// Human-readable section: one block per model, in request order
pub fn text_summary(result: &ComparisonResult) -> String {
    result
        .entries()
        .iter()
        .map(|(model, r)| match r.outcome() {
            ConsultOutcome::Response { response } => format!("Model {model}:\n{response}"),
            ConsultOutcome::Error { error } => format!("Model {model} failed: {error}"),
        })
        .collect::<Vec<_>>()
        .join(SUMMARY_SEPARATOR)
}

/// Structured JSON, then the text summary. Never fails: problems become
/// an `Error: ...` result.
pub async fn compare_models(
    backend: &dyn InferenceBackend,
    request: &CompareRequest,
    fallback_model: &str,
) -> ToolResult {
    let result = match run_comparison(backend, request, fallback_model).await {
        Ok(result) => result,
        Err(e) => return ToolResult::failure(TOOL_NAME, format!("Error: {}", e.cause())),
    };

    // Rendered straight from the result so the comparison keys keep request order
    let encoded = serde_json::to_string_pretty(&result)
        .and_then(|pretty| serde_json::to_value(&result).map(|value| (pretty, value)));
    let (pretty, structured) = match encoded {
        Ok(encoded) => encoded,
        Err(e) => {
            return ToolResult::failure(TOOL_NAME, format!("Error: cannot encode comparison: {e}"));
        }
    };

    tracing::info!(
        models = result.len(),
        succeeded = result.succeeded(),
        "comparison finished"
    );

    let output = format!("{pretty}{SUMMARY_HEADER}{}", text_summary(&result));
    ToolResult::success(TOOL_NAME, output).with_data(structured)
}

pub struct CompareModelsTool {
    backend: Arc<dyn InferenceBackend>,
    fallback_model: String,
}

impl CompareModelsTool {
    /// `fallback_model` is used when no models are given and listing fails
    pub fn new(backend: Arc<dyn InferenceBackend>, fallback_model: impl Into<String>) -> Self {
        Self {
            backend,
            fallback_model: fallback_model.into(),
        }
    }
}

#[async_trait]
impl Tool for CompareModelsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Run the same prompt against multiple Ollama models and return their outputs side-by-side for comparison.".into(),
            parameters: vec![
                ParameterSchema::string("prompt", "The prompt to send to all models", true),
                ParameterSchema::string_array(
                    "models",
                    "List of model names to use. If not provided, uses first 2 available models",
                ),
                ParameterSchema::string("system_prompt", "Optional system prompt to set context", false),
            ],
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let request = CompareRequest {
            prompt: call.required_str("prompt")?.to_string(),
            models: call.optional_str_list("models")?,
            system_prompt: call.optional_str("system_prompt")?.map(str::to_string),
        };

        Ok(compare_models(self.backend.as_ref(), &request, &self.fallback_model).await)
    }
}
