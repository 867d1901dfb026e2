//! # consult-core
//!
//! Core types for fast-consult: the inference backend abstraction and the
//! tool/prompt registries exposed over the tool protocol.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Protocol Server                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │   Prompt    │  │    Tools    │  │  InferenceBackend   │  │
//! │  │  Registry   │  │   Registry  │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `InferenceBackend` trait lets tools run against Ollama over HTTP or a
//! scripted backend in tests without changing tool logic.

pub mod backend;
pub mod error;
pub mod message;
pub mod prompt;
pub mod tool;

pub use backend::{ConsultRequest, InferenceBackend, ModelDescriptor};
pub use error::{ConsultError, Result};
pub use message::{Message, Role};
pub use prompt::{PromptDefinition, PromptRegistry, PromptTemplate};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
