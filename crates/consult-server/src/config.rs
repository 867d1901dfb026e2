//! Server Configuration
//!
//! Built once in `main` from the environment (optionally seeded by `.env`)
//! and handed to constructors; nothing else reads the environment.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;

use consult_runtime::OllamaConfig;
use consult_tools::{MemoryStore, DEFAULT_FALLBACK_MODEL};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_CONFIG_PATH: &str = "./mcp.config.json";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Transport {
    #[default]
    Stdio,
    Http,
}

impl std::str::FromStr for Transport {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "stdio" => Ok(Self::Stdio),
            "http" => Ok(Self::Http),
            other => bail!("MCP_TRANSPORT must be 'stdio' or 'http', got '{other}'"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub ollama: OllamaConfig,
    pub memory_dir: PathBuf,
    /// Model used when comparison has nothing else to go on
    pub default_model: String,
    /// `None` exposes every tool
    pub allowed_tools: Option<Vec<String>>,
    pub transport: Transport,
    pub bind_addr: SocketAddr,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileConfig {
    #[serde(default)]
    allowed_tools: Option<Vec<String>>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let ollama = OllamaConfig::from_env().context("invalid Ollama configuration")?;
        Self::from_vars(ollama, |key| std::env::var(key).ok())
    }

    /// Resolve everything except the Ollama section through `var`
    pub fn from_vars(
        ollama: OllamaConfig,
        var: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let memory_dir = non_empty("MEMORY_DIR").map_or_else(MemoryStore::default_dir, PathBuf::from);

        let default_model = non_empty("OLLAMA_DEFAULT_MODEL")
            .map_or_else(|| DEFAULT_FALLBACK_MODEL.to_string(), |m| m.trim().to_string());

        let transport = var("MCP_TRANSPORT").unwrap_or_default().parse()?;

        let bind_addr = non_empty("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.into())
            .parse()
            .context("BIND_ADDR must be a socket address like 127.0.0.1:3000")?;

        let allowed_tools = match non_empty("MCP_ALLOWED_TOOLS") {
            Some(raw) => Some(parse_allowed_tools(&raw)),
            None => {
                let path = non_empty("MCP_CONFIG_PATH").unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());
                load_allowed_tools(Path::new(&path))?
            }
        };

        Ok(Self {
            ollama,
            memory_dir,
            default_model,
            allowed_tools,
            transport,
            bind_addr,
        })
    }
}

/// Accepts a JSON array of names or a comma-separated list
pub fn parse_allowed_tools(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.starts_with('[') {
        if let Ok(names) = serde_json::from_str::<Vec<String>>(raw) {
            return clean(names);
        }
        tracing::warn!(value = raw, "MCP_ALLOWED_TOOLS is not a JSON string array, reading as a list");
    }

    clean(
        raw.trim_matches(|c| c == '[' || c == ']')
            .split(',')
            .map(|s| s.trim().trim_matches('"').to_string()),
    )
}

fn clean(names: impl IntoIterator<Item = String>) -> Vec<String> {
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

/// A missing file means no whitelist; an unreadable or malformed one is an error.
fn load_allowed_tools(path: &Path) -> anyhow::Result<Option<Vec<String>>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };

    let file: FileConfig = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded tool configuration");

    Ok(file.allowed_tools.map(clean))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let mut vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        vars.entry("MCP_CONFIG_PATH".into())
            .or_insert_with(|| "/nonexistent/mcp.config.json".into());
        ServerConfig::from_vars(OllamaConfig::default(), |k| vars.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.transport, Transport::Stdio);
        assert_eq!(cfg.bind_addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.default_model, "llama2");
        assert_eq!(cfg.memory_dir, MemoryStore::default_dir());
        assert!(cfg.allowed_tools.is_none());
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("MCP_TRANSPORT", "HTTP"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("OLLAMA_DEFAULT_MODEL", " llama3.2 "),
            ("MEMORY_DIR", "/var/lib/consult"),
        ])
        .unwrap();
        assert_eq!(cfg.transport, Transport::Http);
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.default_model, "llama3.2");
        assert_eq!(cfg.memory_dir, PathBuf::from("/var/lib/consult"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("MCP_TRANSPORT", "sse")]).is_err());
        assert!(config(&[("BIND_ADDR", "localhost")]).is_err());
    }

    #[test]
    fn allowed_tools_formats() {
        assert_eq!(
            parse_allowed_tools(r#"["consult_ollama", "list_ollama_models"]"#),
            vec!["consult_ollama", "list_ollama_models"]
        );
        assert_eq!(
            parse_allowed_tools(" consult_ollama, ,remember_consult "),
            vec!["consult_ollama", "remember_consult"]
        );
        assert_eq!(parse_allowed_tools("[consult_ollama]"), vec!["consult_ollama"]);
    }

    #[test]
    fn env_whitelist_wins_over_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mcp.config.json");
        std::fs::write(&path, r#"{"allowedTools": ["remember_consult"]}"#).unwrap();
        let path = path.to_string_lossy().into_owned();

        let from_file = config(&[("MCP_CONFIG_PATH", path.as_str())]).unwrap();
        assert_eq!(from_file.allowed_tools, Some(vec!["remember_consult".to_string()]));

        let from_env = config(&[
            ("MCP_CONFIG_PATH", path.as_str()),
            ("MCP_ALLOWED_TOOLS", "consult_ollama"),
        ])
        .unwrap();
        assert_eq!(from_env.allowed_tools, Some(vec!["consult_ollama".to_string()]));
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mcp.config.json");
        std::fs::write(&path, "{ nope").unwrap();

        assert!(config(&[("MCP_CONFIG_PATH", path.to_str().unwrap())]).is_err());
    }

    #[test]
    fn file_without_whitelist_exposes_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mcp.config.json");
        std::fs::write(&path, r#"{"other": true}"#).unwrap();

        let cfg = config(&[("MCP_CONFIG_PATH", path.to_str().unwrap())]).unwrap();
        assert!(cfg.allowed_tools.is_none());
    }
}
