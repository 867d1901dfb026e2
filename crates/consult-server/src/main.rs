//! fast-consult server
//!
//! Exposes the consult tools and prompt templates over JSON-RPC, on stdio
//! (default) or HTTP. Logs go to stderr so stdout stays a clean protocol
//! channel.

mod config;
mod handlers;
mod protocol;
mod state;
mod transport;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use consult_core::InferenceBackend;
use consult_runtime::OllamaClient;
use consult_tools::{default_prompts, default_tools, MemoryStore};

use crate::config::{ServerConfig, Transport};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ServerConfig::from_env()?;

    // Initialize backend
    let ollama = OllamaClient::new(config.ollama.clone());
    if ollama.health_check().await {
        tracing::info!(base_url = %config.ollama.base_url, "connected to Ollama");
    } else {
        tracing::warn!(base_url = %config.ollama.base_url, "Ollama not reachable, tool calls will report errors");
        tracing::warn!("  Make sure Ollama is running: ollama serve");
    }
    let backend: Arc<dyn InferenceBackend> = Arc::new(ollama);

    // Initialize tools
    let store = MemoryStore::new(&config.memory_dir);
    let mut tools = default_tools(backend.clone(), store, &config.default_model);
    if let Some(allowed) = &config.allowed_tools {
        tools.retain(allowed);
        tracing::info!(allowed = ?allowed, "tool whitelist applied");
    }

    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }
    tracing::info!(
        memory_dir = %config.memory_dir.display(),
        default_model = %config.default_model,
        "configuration loaded"
    );

    let state = AppState {
        backend,
        tools: Arc::new(tools),
        prompts: Arc::new(default_prompts()),
    };

    match config.transport {
        Transport::Stdio => transport::serve_stdio(state).await,
        Transport::Http => transport::serve_http(state, config.bind_addr).await,
    }
}
