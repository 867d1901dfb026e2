//! # consult-tools
//!
//! The four consult tools and their prompt templates.
//!
//! ## Tools
//!
//! - **`consult_ollama`** - one prompt, one model
//! - **`list_ollama_models`** - installed model names
//! - **`compare_ollama_models`** - one prompt, several models, run in sequence
//! - **`remember_consult`** - persist a consultation as a JSON record
//!
//! ## Comparison output
//!
//! ```text
//! {
//!   "comparison": {
//!     "llama3.2": { "response": "...", "success": true,  "timestamp": 1760875200.12 },
//!     "mistral":  { "error":    "...", "success": false, "timestamp": 1760875203.48 }
//!   },
//!   "metadata": { "prompt": "...", "system_prompt": null, "models_used": [...], "timestamp": ... }
//! }
//!
//! --- Text Summary ---
//!
//! Model llama3.2:
//! ...
//!
//! ---
//!
//! Model mistral failed: Ollama request failed: ...
//! ```

use std::sync::Arc;

use consult_core::{InferenceBackend, ToolRegistry};

pub mod error;
pub mod memory;
pub mod model;
pub mod prompts;
pub mod svckit;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use model::{ComparisonResult, ConsultOutcome, ConsultResult, MemoryRecord};
pub use prompts::default_prompts;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{CompareModelsTool, ConsultTool, ListModelsTool, RememberTool};
}

/// Model consulted when comparison has no explicit models and listing fails
pub const DEFAULT_FALLBACK_MODEL: &str = "llama2";

/// Registry with all four tools sharing one backend
pub fn default_tools(
    backend: Arc<dyn InferenceBackend>,
    store: MemoryStore,
    fallback_model: &str,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(tools::ConsultTool::new(backend.clone()));
    registry.register(tools::ListModelsTool::new(backend.clone()));
    registry.register(tools::CompareModelsTool::new(backend.clone(), fallback_model));
    registry.register(tools::RememberTool::new(backend, store));
    registry
}
