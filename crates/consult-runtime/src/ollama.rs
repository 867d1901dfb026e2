//! Ollama Backend
//!
//! Thin HTTP client for a local Ollama server. One call, one request:
//! failures surface immediately as [`ConsultError::Backend`] with no retries.

use std::time::Duration;

use async_trait::async_trait;
use consult_core::{
    backend::{ConsultRequest, InferenceBackend, ModelDescriptor, GENERATE_ENDPOINT, TAGS_ENDPOINT},
    error::{ConsultError, Result},
};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;

/// Default Ollama base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default timeout for generation calls
pub const DEFAULT_GENERATE_TIMEOUT: Duration = Duration::from_secs(300);

/// Default timeout for model listing calls
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(30);

/// Ollama client configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OllamaConfig {
    /// Base URL without trailing slash (e.g. `http://localhost:11434`)
    pub base_url: String,

    /// Timeout applied to `/api/generate`
    pub generate_timeout: Duration,

    /// Timeout applied to `/api/tags`
    pub list_timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            generate_timeout: DEFAULT_GENERATE_TIMEOUT,
            list_timeout: DEFAULT_LIST_TIMEOUT,
        }
    }
}

impl OllamaConfig {
    /// Build a config for the given base URL with default timeouts
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: validate_base_url(base_url)?,
            ..Default::default()
        })
    }

    /// Read `OLLAMA_BASE_URL`, `OLLAMA_GENERATE_TIMEOUT_SECS` and
    /// `OLLAMA_LIST_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        Ok(Self {
            base_url: validate_base_url(&base_url)?,
            generate_timeout: timeout_from_env(
                "OLLAMA_GENERATE_TIMEOUT_SECS",
                DEFAULT_GENERATE_TIMEOUT,
            )?,
            list_timeout: timeout_from_env("OLLAMA_LIST_TIMEOUT_SECS", DEFAULT_LIST_TIMEOUT)?,
        })
    }
}

/// Accept only absolute http(s) URLs; strip trailing slashes
fn validate_base_url(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw)
        .map_err(|e| ConsultError::Config(format!("Invalid Ollama base URL {raw}: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConsultError::Config(format!(
            "Ollama base URL must use http or https: {raw}"
        )));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

fn timeout_from_env(var: &str, default: Duration) -> Result<Duration> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ConsultError::Config(format!("{var} must be a positive number of seconds"))
            }),
        Err(_) => Ok(default),
    }
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<Value>,
}

/// HTTP client for the Ollama API
#[derive(Clone, Debug)]
pub struct OllamaClient {
    http: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub const fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Issue one request to the backend and decode its JSON body.
    ///
    /// GET is used for the listing endpoint or when `payload` is empty
    /// (`null` or `{}`); anything else is POSTed as JSON.
    pub async fn request(&self, endpoint: &str, payload: &Value, timeout: Duration) -> Result<Value> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        let use_get = endpoint == TAGS_ENDPOINT || is_empty_payload(payload);

        tracing::debug!(
            method = if use_get { "GET" } else { "POST" },
            %url,
            timeout_secs = timeout.as_secs(),
            "ollama request"
        );

        let builder = if use_get {
            self.http.get(&url)
        } else {
            self.http.post(&url).json(payload)
        };

        let response = builder
            .timeout(timeout)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                tracing::warn!(%url, error = %e, "ollama request failed");
                ConsultError::Backend(e.to_string())
            })?;

        response
            .json::<Value>()
            .await
            .map_err(|e| ConsultError::Backend(format!("invalid JSON from {url}: {e}")))
    }

    /// Whether the server answers the listing endpoint
    pub async fn health_check(&self) -> bool {
        match self.list_models().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
                false
            }
        }
    }
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[async_trait]
impl InferenceBackend for OllamaClient {
    async fn generate(&self, request: &ConsultRequest) -> Result<String> {
        let body = self
            .request(GENERATE_ENDPOINT, &request.to_payload(), self.config.generate_timeout)
            .await?;

        Ok(body
            .get("response")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        let body = self
            .request(TAGS_ENDPOINT, &Value::Null, self.config.list_timeout)
            .await?;

        let tags: TagsResponse = serde_json::from_value(body)
            .map_err(|e| ConsultError::Backend(format!("unexpected listing response: {e}")))?;

        tags.models
            .iter()
            .map(|entry| {
                entry
                    .get("name")
                    .and_then(Value::as_str)
                    .map(ModelDescriptor::new)
                    .ok_or_else(|| {
                        ConsultError::Backend(format!("model entry without a name: {entry}"))
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;

    async fn spawn_backend(router: Router) -> OllamaClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        OllamaClient::new(OllamaConfig::new(&format!("http://{addr}")).unwrap())
    }

    #[test]
    fn test_config_defaults() {
        let config = OllamaConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.generate_timeout, Duration::from_secs(300));
        assert_eq!(config.list_timeout, Duration::from_secs(30));
    }

    #[test]
    fn base_url_validation() {
        assert_eq!(
            OllamaConfig::new("http://gpu-box:11434/").unwrap().base_url,
            "http://gpu-box:11434"
        );
        assert!(OllamaConfig::new("ftp://gpu-box").is_err());
        assert!(OllamaConfig::new("not a url").is_err());
    }

    #[test]
    fn empty_payload_detection() {
        assert!(is_empty_payload(&Value::Null));
        assert!(is_empty_payload(&json!({})));
        assert!(!is_empty_payload(&json!({"model": "m"})));
    }

    #[tokio::test]
    async fn generate_posts_request_body() {
        let router = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["stream"], false);
                assert_eq!(body["system"], "be brief");
                Json(json!({"response": format!("{} says hello", body["model"].as_str().unwrap())}))
            }),
        );
        let client = spawn_backend(router).await;

        let request = ConsultRequest::new("m1", "hi").with_system_prompt(Some("be brief"));
        assert_eq!(client.generate(&request).await.unwrap(), "m1 says hello");
    }

    #[tokio::test]
    async fn generate_without_response_field_is_empty() {
        let router = Router::new().route("/api/generate", post(|| async { Json(json!({"done": true})) }));
        let client = spawn_backend(router).await;

        assert_eq!(client.generate(&ConsultRequest::new("m1", "hi")).await.unwrap(), "");
    }

    #[tokio::test]
    async fn list_models_uses_get() {
        let router = Router::new().route(
            "/api/tags",
            get(|| async { Json(json!({"models": [{"name": "a", "size": 1}, {"name": "b"}]})) }),
        );
        let client = spawn_backend(router).await;

        let names: Vec<_> = client
            .list_models()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn empty_payload_uses_get_on_any_endpoint() {
        let router = Router::new().route("/api/version", get(|| async { Json(json!({"version": "0.5.1"})) }));
        let client = spawn_backend(router).await;

        let body = client
            .request("/api/version", &json!({}), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(body["version"], "0.5.1");
    }

    #[tokio::test]
    async fn error_status_is_backend_error() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async { (StatusCode::NOT_FOUND, "model 'ghost' not found") }),
        );
        let client = spawn_backend(router).await;

        let err = client.generate(&ConsultRequest::new("ghost", "hi")).await.unwrap_err();
        assert!(matches!(err, ConsultError::Backend(_)));
        assert!(err.to_string().starts_with("Ollama request failed:"));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn nameless_model_entry_is_rejected() {
        let router = Router::new().route("/api/tags", get(|| async { Json(json!({"models": [{"size": 1}]})) }));
        let client = spawn_backend(router).await;

        assert!(matches!(client.list_models().await, Err(ConsultError::Backend(_))));
    }

    #[tokio::test]
    async fn timeout_is_backend_error() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"response": "late"}))
            }),
        );
        let client = spawn_backend(router).await;

        let result = client
            .request(
                GENERATE_ENDPOINT,
                &ConsultRequest::new("m1", "hi").to_payload(),
                Duration::from_millis(100),
            )
            .await;
        assert!(matches!(result, Err(ConsultError::Backend(_))));
    }

    #[tokio::test]
    async fn unreachable_server_is_backend_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OllamaClient::new(OllamaConfig::new(&format!("http://{addr}")).unwrap());
        assert!(!client.health_check().await);
        assert!(matches!(
            client.generate(&ConsultRequest::new("m1", "hi")).await,
            Err(ConsultError::Backend(_))
        ));
    }
}
