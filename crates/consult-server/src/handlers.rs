//! JSON-RPC Handlers
//!
//! Transport-independent dispatch: both the stdio loop and the HTTP endpoint
//! feed raw messages through [`handle_message`].

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use consult_core::{prompt::PromptArgs, ToolCall, ToolResult};

use crate::protocol::{JsonRpcRequest, JsonRpcResponse, RpcError, JSONRPC_VERSION, PROTOCOL_VERSION};
use crate::state::AppState;

const SERVER_NAME: &str = "fast-consult";

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct GetPromptParams {
    name: String,
    #[serde(default)]
    arguments: Option<Map<String, Value>>,
}

/// Parse and dispatch one raw message. `None` means nothing to send back.
pub async fn handle_message(state: &AppState, raw: &str) -> Option<JsonRpcResponse> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable message");
            return Some(JsonRpcResponse::failure(Value::Null, RpcError::parse_error(e)));
        }
    };

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    match serde_json::from_value::<JsonRpcRequest>(value) {
        Ok(request) => handle_request(state, request).await,
        Err(e) => Some(JsonRpcResponse::failure(id, RpcError::invalid_request(e))),
    }
}

/// Dispatch a decoded request
pub async fn handle_request(state: &AppState, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    if request.jsonrpc != JSONRPC_VERSION {
        return Some(JsonRpcResponse::failure(
            request.id.unwrap_or(Value::Null),
            RpcError::invalid_request(format!("unsupported jsonrpc version {}", request.jsonrpc)),
        ));
    }

    tracing::debug!(method = %request.method, "dispatching");
    let notification = request.is_notification();

    let outcome = match request.method.as_str() {
        "initialize" => Ok(initialize(&request.params)),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(list_tools(state)),
        "tools/call" => call_tool(state, request.params).await,
        "prompts/list" => Ok(list_prompts(state)),
        "prompts/get" => get_prompt(state, request.params),
        method if method.starts_with("notifications/") => {
            tracing::debug!(method, "notification received");
            return None;
        }
        method => Err(RpcError::method_not_found(method)),
    };

    if notification {
        return None;
    }
    let id = request.id.unwrap_or(Value::Null);
    Some(match outcome {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(error) => JsonRpcResponse::failure(id, error),
    })
}

fn initialize(params: &Value) -> Value {
    let version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(PROTOCOL_VERSION);

    json!({
        "protocolVersion": version,
        "capabilities": {
            "tools": { "listChanged": false },
            "prompts": { "listChanged": false },
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

fn list_tools(state: &AppState) -> Value {
    let tools: Vec<_> = state
        .tools
        .schemas()
        .into_iter()
        .map(|schema| {
            json!({
                "name": schema.name,
                "description": schema.description,
                "inputSchema": schema.input_schema(),
                "annotations": schema.annotations(),
            })
        })
        .collect();

    json!({ "tools": tools })
}

fn tool_result_json(result: ToolResult) -> Value {
    let mut body = json!({
        "content": [{ "type": "text", "text": result.output }],
        "isError": !result.success,
    });
    if let Some(data) = result.data {
        body["structuredContent"] = data;
    }
    body
}

async fn call_tool(state: &AppState, params: Value) -> Result<Value, RpcError> {
    let params: CallToolParams = serde_json::from_value(params).map_err(RpcError::invalid_params)?;

    let call = ToolCall {
        name: params.name,
        arguments: params.arguments.unwrap_or_default().into_iter().collect::<HashMap<_, _>>(),
        id: None,
    };

    match state.tools.execute(&call).await {
        Ok(result) => {
            tracing::info!(tool = %call.name, success = result.success, "tool call finished");
            Ok(tool_result_json(result))
        }
        Err(e) if e.is_invalid_input() => Err(RpcError::invalid_params(e)),
        Err(e) => {
            tracing::error!(tool = %call.name, error = %e, "tool call failed");
            Err(RpcError::internal(e))
        }
    }
}

fn list_prompts(state: &AppState) -> Value {
    let prompts: Vec<_> = state
        .prompts
        .definitions()
        .into_iter()
        .map(|def| {
            json!({
                "name": def.name,
                "description": def.description,
                "arguments": def.arguments,
            })
        })
        .collect();

    json!({ "prompts": prompts })
}

fn get_prompt(state: &AppState, params: Value) -> Result<Value, RpcError> {
    let params: GetPromptParams = serde_json::from_value(params).map_err(RpcError::invalid_params)?;

    let args: PromptArgs = params
        .arguments
        .unwrap_or_default()
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| match v {
            Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect();

    let messages = state
        .prompts
        .render(&params.name, &args)
        .map_err(RpcError::invalid_params)?;

    let description = state
        .prompts
        .get(&params.name)
        .map(|p| p.definition().description)
        .unwrap_or_default();

    let messages: Vec<_> = messages
        .into_iter()
        .map(|m| {
            json!({
                "role": m.role,
                "content": { "type": "text", "text": m.content },
            })
        })
        .collect();

    Ok(json!({ "description": description, "messages": messages }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR};
    use consult_runtime::MockBackend;
    use consult_tools::{default_prompts, default_tools, MemoryStore};
    use std::sync::Arc;

    fn state_with(backend: MockBackend, memory_dir: &std::path::Path) -> AppState {
        let backend: Arc<dyn consult_core::InferenceBackend> = Arc::new(backend);
        AppState {
            tools: Arc::new(default_tools(backend.clone(), MemoryStore::new(memory_dir), "llama2")),
            prompts: Arc::new(default_prompts()),
            backend,
        }
    }

    async fn call(state: &AppState, message: Value) -> JsonRpcResponse {
        handle_message(state, &message.to_string()).await.unwrap()
    }

    #[tokio::test]
    async fn initialize_advertises_capabilities() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_with(MockBackend::new(), tmp.path());

        let resp = call(
            &state,
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"protocolVersion": "2025-03-26"}}),
        )
        .await;
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "fast-consult");
        assert!(result["capabilities"]["tools"].is_object());
        assert!(result["capabilities"]["prompts"].is_object());
    }

    #[tokio::test]
    async fn notifications_get_no_reply() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_with(MockBackend::new(), tmp.path());

        let reply = handle_message(
            &state,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        )
        .await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn lists_four_tools_with_schemas() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_with(MockBackend::new(), tmp.path());

        let resp = call(&state, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
        let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
        let names: Vec<_> = tools.iter().map(|t| t["name"].as_str().unwrap().to_string()).collect();

        assert_eq!(
            names,
            vec!["compare_ollama_models", "consult_ollama", "list_ollama_models", "remember_consult"]
        );
        let consult = &tools[1];
        assert_eq!(consult["inputSchema"]["required"], json!(["model", "prompt"]));
        assert_eq!(consult["annotations"]["readOnlyHint"], true);
        assert_eq!(tools[3]["annotations"]["readOnlyHint"], false);
    }

    #[tokio::test]
    async fn consult_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_with(MockBackend::new().with_response("m1", "hello"), tmp.path());

        let resp = call(
            &state,
            json!({"jsonrpc": "2.0", "id": "a", "method": "tools/call",
                   "params": {"name": "consult_ollama", "arguments": {"model": "m1", "prompt": "hi"}}}),
        )
        .await;

        assert_eq!(resp.id, json!("a"));
        let result = resp.result.unwrap();
        assert_eq!(result["content"][0]["text"], "hello");
        assert_eq!(result["isError"], false);
    }

    #[tokio::test]
    async fn backend_failure_is_tool_content_not_rpc_error() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_with(MockBackend::new().with_listing_failure("connection refused"), tmp.path());

        let resp = call(
            &state,
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
                   "params": {"name": "list_ollama_models"}}),
        )
        .await;

        assert!(resp.error.is_none());
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("Error listing models:"));
    }

    #[tokio::test]
    async fn comparison_carries_structured_content() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_with(
            MockBackend::new().with_response("a", "1").with_failure("b", "down"),
            tmp.path(),
        );

        let resp = call(
            &state,
            json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call",
                   "params": {"name": "compare_ollama_models", "arguments": {"prompt": "hi", "models": ["a", "b"]}}}),
        )
        .await;

        let result = resp.result.unwrap();
        assert_eq!(result["structuredContent"]["comparison"]["a"]["success"], true);
        assert_eq!(result["structuredContent"]["comparison"]["b"]["success"], false);
    }

    #[tokio::test]
    async fn remember_writes_into_memory_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_with(MockBackend::new(), tmp.path());

        let resp = call(
            &state,
            json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call",
                   "params": {"name": "remember_consult", "arguments": {"prompt": "p", "response": "r"}}}),
        )
        .await;

        let text = resp.result.unwrap()["content"][0]["text"].as_str().unwrap().to_string();
        assert!(text.starts_with("Saved consult to "));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn missing_argument_is_invalid_params() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_with(MockBackend::new(), tmp.path());

        let resp = call(
            &state,
            json!({"jsonrpc": "2.0", "id": 6, "method": "tools/call",
                   "params": {"name": "consult_ollama", "arguments": {"prompt": "hi"}}}),
        )
        .await;
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);

        let resp = call(
            &state,
            json!({"jsonrpc": "2.0", "id": 7, "method": "tools/call", "params": {"name": "nope"}}),
        )
        .await;
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn prompts_list_and_get() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_with(MockBackend::new(), tmp.path());

        let resp = call(&state, json!({"jsonrpc": "2.0", "id": 8, "method": "prompts/list"})).await;
        assert_eq!(resp.result.unwrap()["prompts"].as_array().unwrap().len(), 4);

        let resp = call(
            &state,
            json!({"jsonrpc": "2.0", "id": 9, "method": "prompts/get",
                   "params": {"name": "consultation_prompt", "arguments": {"topic": "monorepos"}}}),
        )
        .await;
        let result = resp.result.unwrap();
        assert_eq!(result["messages"][0]["role"], "user");
        assert!(result["messages"][0]["content"]["text"]
            .as_str()
            .unwrap()
            .starts_with("Please provide a alternative viewpoint on: monorepos"));

        let resp = call(
            &state,
            json!({"jsonrpc": "2.0", "id": 10, "method": "prompts/get", "params": {"name": "memory_prompt"}}),
        )
        .await;
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn protocol_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_with(MockBackend::new(), tmp.path());

        let resp = handle_message(&state, "{not json").await.unwrap();
        assert_eq!(resp.error.unwrap().code, PARSE_ERROR);

        let resp = call(&state, json!({"jsonrpc": "2.0", "id": 11, "method": "resources/list"})).await;
        assert_eq!(resp.error.unwrap().code, METHOD_NOT_FOUND);

        let resp = call(&state, json!({"jsonrpc": "1.0", "id": 12, "method": "ping"})).await;
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);

        let resp = call(&state, json!({"jsonrpc": "2.0", "id": 13})).await;
        assert_eq!(resp.id, json!(13));
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);

        let resp = call(&state, json!({"jsonrpc": "2.0", "id": 14, "method": "ping"})).await;
        assert_eq!(resp.result.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn null_id_is_answered() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_with(MockBackend::new(), tmp.path());

        let resp = handle_message(&state, r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(resp.id, Value::Null);
        assert_eq!(resp.result.unwrap(), json!({}));

        let unknown = handle_message(&state, r#"{"jsonrpc":"2.0","id":null,"method":"nope"}"#)
            .await
            .unwrap();
        assert_eq!(unknown.error.unwrap().code, METHOD_NOT_FOUND);
    }
}
