//! Transports
//!
//! stdio: one JSON-RPC message per line in, one response per line out,
//! processed strictly in arrival order.
//!
//! HTTP: `POST /mcp` carries a single message, `GET /health` reports backend
//! reachability.

use std::net::SocketAddr;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::handle_message;
use crate::protocol::{JsonRpcResponse, RpcError};
use crate::state::AppState;

// ============================================================================
// stdio
// ============================================================================

/// Serve newline-delimited messages until `reader` reaches EOF.
///
/// A line that is not UTF-8 gets a parse error reply like any other bad JSON.
pub async fn serve_lines<R, W>(state: &AppState, mut reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => handle_message(state, line.trim()).await,
            Err(e) => {
                tracing::warn!(error = %e, "non UTF-8 message on stdin");
                Some(JsonRpcResponse::failure(Value::Null, RpcError::parse_error(e)))
            }
        };

        if let Some(response) = response {
            let mut out = serde_json::to_vec(&response)?;
            out.push(b'\n');
            writer.write_all(&out).await?;
            writer.flush().await?;
        }
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}

pub async fn serve_stdio(state: AppState) -> anyhow::Result<()> {
    tracing::info!("serving on stdio");
    serve_lines(&state, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

// ============================================================================
// HTTP
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub ollama_connected: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ollama_connected = state.backend.list_models().await.is_ok();

    Json(HealthResponse {
        status: if ollama_connected { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        ollama_connected,
    })
}

/// Notifications are acknowledged with `202 Accepted` and an empty body
pub async fn rpc_handler(State(state): State<AppState>, body: String) -> Response {
    match handle_message(&state, &body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/mcp", post(rpc_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve_http(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("fast-consult listening on http://{}", listener.local_addr()?);
    tracing::info!("  POST /mcp    - JSON-RPC endpoint");
    tracing::info!("  GET  /health - Backend health");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
