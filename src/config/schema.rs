//! Configuration schema for ctf-agent.toml.

use serde::{Deserialize, Serialize};

/// Environment variables consulted, in order, when `api_key` is empty.
pub const API_KEY_ENV_VARS: &[&str] = &["CTF_AGENT_API_KEY", "OPENAI_API_KEY"];

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Base URL of the OpenAI-compatible API (without `/chat/completions`).
    pub api_base_url: String,

    /// API key sent as a bearer token.
    pub api_key: String,

    /// Model identifier for every chat completion.
    pub model: String,

    /// Maximum number of model turns before the run is stopped.
    pub max_turns: u32,

    /// Maximum completion tokens per model turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Whether the model may request several tool calls in one turn.
    pub parallel_tool_calls: bool,

    /// Timeout for a single chat-completion request.
    pub request_timeout_secs: u64,

    /// Interpreter used by `run_python_file`.
    pub python_interpreter: String,

    /// Log level (debug, info, warn, error).
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.metisai.ir/openai/v1".into(),
            api_key: String::new(),
            model: "gpt-4.1-mini".into(),
            max_turns: 50,
            max_tokens: None,
            temperature: None,
            parallel_tool_calls: false,
            request_timeout_secs: 300,
            python_interpreter: "python3".into(),
            log_level: "info".into(),
        }
    }
}

impl AgentConfig {
    /// Resolve a path that may contain `~` to an absolute path.
    pub fn resolve_path(path: &str) -> String {
        shellexpand::tilde(path).into_owned()
    }

    /// The configured API key, falling back to the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        if !self.api_key.trim().is_empty() {
            return Some(self.api_key.trim().to_string());
        }
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
    }
}
