//! # consult-runtime
//!
//! Inference backends for fast-consult.
//!
//! ## Backends
//!
//! - **Ollama** (default): local inference server over HTTP
//! - **Mock**: scripted responses for tests and offline demos
//!
//! ## Usage
//!
//! ```rust,ignore
//! use consult_runtime::{OllamaClient, OllamaConfig};
//!
//! let backend = Arc::new(OllamaClient::new(OllamaConfig::from_env()?));
//! let text = backend.generate(&ConsultRequest::new("llama3.2", "hi")).await?;
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;
pub mod mock;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaClient, OllamaConfig};
pub use mock::MockBackend;

// Re-export core types for convenience
pub use consult_core::{ConsultError, ConsultRequest, InferenceBackend, ModelDescriptor, Result};
