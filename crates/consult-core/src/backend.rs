//! Inference Backend Abstraction
//!
//! Tools talk to the model server exclusively through [`InferenceBackend`],
//! so the HTTP client can be swapped for a scripted backend in tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use consult_core::backend::{ConsultRequest, InferenceBackend};
//!
//! let request = ConsultRequest::new("llama3.2", "Why is the sky blue?");
//! let text = backend.generate(&request).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;

/// Generation endpoint path
pub const GENERATE_ENDPOINT: &str = "/api/generate";

/// Model listing endpoint path
pub const TAGS_ENDPOINT: &str = "/api/tags";

/// A single prompt addressed to a single model
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultRequest {
    /// Model identifier (e.g., "llama3.2", "mistral:7b")
    pub model: String,

    /// User prompt
    pub prompt: String,

    /// Optional system prompt sent as the backend's `system` field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl ConsultRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system_prompt: None,
        }
    }

    /// Attach a system prompt; empty strings are treated as absent
    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: Option<impl Into<String>>) -> Self {
        self.system_prompt = system_prompt
            .map(Into::into)
            .filter(|s: &String| !s.is_empty());
        self
    }

    /// Request body for the generation endpoint, streaming disabled
    pub fn to_payload(&self) -> Value {
        let mut body = json!({
            "model": self.model,
            "prompt": self.prompt,
            "stream": false,
        });

        if let Some(system) = self.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            body["system"] = json!(system);
        }

        body
    }
}

/// An installed model as reported by the listing endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Strategy trait for inference backends
///
/// Every failure is a [`ConsultError::Backend`](crate::ConsultError::Backend);
/// implementations never retry.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Run one non-streaming generation and return the response text
    async fn generate(&self, request: &ConsultRequest) -> Result<String>;

    /// List installed models in backend order
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>>;
}
