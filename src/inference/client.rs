//! Model inference via an OpenAI-compatible chat-completions API.
//!
//! Supports tool-use (function calling) in the OpenAI-compatible format.

use super::ChatModel;
use crate::config::AgentConfig;
use crate::tools::ToolDefinition;
use crate::types::*;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Inference client wrapping a chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
    parallel_tool_calls: bool,
    http: reqwest::Client,
}

// -- OpenAI-compatible request/response types --------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<MessagePayload<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolPayload<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parallel_tool_calls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
struct MessagePayload<'a> {
    role: &'a str,
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCallPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ToolPayload<'a> {
    r#type: &'a str,
    function: FunctionPayload<'a>,
}

#[derive(Debug, Serialize)]
struct FunctionPayload<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCallPayload {
    id: String,
    r#type: String,
    function: FunctionCallPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCallPayload {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallPayload>>,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl<'a> MessagePayload<'a> {
    fn from_message(m: &'a ChatMessage) -> Self {
        let has_calls = !m.tool_calls.is_empty();
        Self {
            role: match m.role {
                ChatRole::System => "system",
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
                ChatRole::Tool => "tool",
            },
            // An assistant turn that only calls tools carries no text.
            content: if has_calls && m.content.is_empty() {
                None
            } else {
                Some(&m.content)
            },
            tool_calls: has_calls.then(|| {
                m.tool_calls
                    .iter()
                    .map(|tc| ToolCallPayload {
                        id: tc.id.clone(),
                        r#type: "function".into(),
                        function: FunctionCallPayload {
                            name: tc.name.clone(),
                            arguments: tc.arguments.to_string(),
                        },
                    })
                    .collect()
            }),
            tool_call_id: m.tool_call_id.as_deref(),
            name: m.name.as_deref(),
        }
    }
}

impl InferenceClient {
    /// Create a new inference client with default request options.
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens: None,
            temperature: None,
            parallel_tool_calls: false,
            http: reqwest::Client::new(),
        }
    }

    /// Create a client from the loaded configuration.
    pub fn from_config(config: &AgentConfig, api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build inference HTTP client")?;
        Ok(Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            parallel_tool_calls: config.parallel_tool_calls,
            http,
            ..Self::new(&config.api_base_url, api_key, &config.model)
        })
    }

    fn build_request<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        tools: &'a [ToolDefinition],
    ) -> ChatRequest<'a> {
        let tool_payloads: Option<Vec<ToolPayload>> = if tools.is_empty() {
            None
        } else {
            Some(
                tools
                    .iter()
                    .map(|t| ToolPayload {
                        r#type: "function",
                        function: FunctionPayload {
                            name: &t.name,
                            description: &t.description,
                            parameters: &t.parameters,
                        },
                    })
                    .collect(),
            )
        };
        let has_tools = tool_payloads.is_some();

        ChatRequest {
            model: &self.model,
            messages: messages.iter().map(MessagePayload::from_message).collect(),
            tools: tool_payloads,
            tool_choice: has_tools.then_some("auto"),
            // The API default allows several calls per turn; only send the
            // flag when restricting it.
            parallel_tool_calls: (has_tools && !self.parallel_tool_calls).then_some(false),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl ChatModel for InferenceClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    /// Run inference with tool support. Returns a response with optional tool calls.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<InferenceResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = self.build_request(messages, tools);

        debug!(
            "Inference request to model {} ({} messages)",
            self.model,
            messages.len()
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Inference request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Inference failed ({}): {}", status, body);
        }

        let body: ChatResponse = resp
            .json()
            .await
            .context("Failed to parse inference response")?;

        let Some(choice) = body.choices.into_iter().next() else {
            bail!("Inference response contained no choices");
        };

        // Parse tool calls; malformed argument JSON becomes an empty object.
        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall::from_raw(tc.id, tc.function.name, &tc.function.arguments))
            .collect();

        let usage = body
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(InferenceResponse {
            content: choice.message.content,
            tool_calls,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tool_definitions;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let client = InferenceClient::new("http://localhost/v1/", "k", "gpt-test");
        let call = ToolCall::from_raw("call_1", "list_files", r#"{"directory_path": "."}"#);
        let messages = vec![
            ChatMessage::system("sys"),
            ChatMessage::user("TASK: x"),
            ChatMessage::assistant("", vec![call.clone()]),
            ChatMessage::tool_result(&call, "[]"),
        ];
        let tools = tool_definitions();

        let body = serde_json::to_value(client.build_request(&messages, &tools)).unwrap();
        assert_eq!(body["model"], "gpt-test");
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["parallel_tool_calls"], false);
        assert_eq!(body["tools"].as_array().unwrap().len(), 14);
        assert_eq!(body["tools"][0]["type"], "function");
        assert!(body.get("max_tokens").is_none());

        let assistant = &body["messages"][2];
        assert!(assistant["content"].is_null());
        assert_eq!(assistant["tool_calls"][0]["function"]["name"], "list_files");
        let args: serde_json::Value = serde_json::from_str(
            assistant["tool_calls"][0]["function"]["arguments"]
                .as_str()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(args, json!({"directory_path": "."}));

        let tool = &body["messages"][3];
        assert_eq!(tool["role"], "tool");
        assert_eq!(tool["tool_call_id"], "call_1");
        assert_eq!(tool["content"], "[]");
    }

    #[test]
    fn test_no_tools_means_no_tool_choice() {
        let client = InferenceClient::new("http://localhost/v1", "k", "m");
        let messages = vec![ChatMessage::user("hi")];
        let body = serde_json::to_value(client.build_request(&messages, &[])).unwrap();
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
        assert!(body.get("parallel_tool_calls").is_none());
    }

    #[tokio::test]
    async fn test_chat_parses_tool_calls() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({"model": "gpt-test", "tool_choice": "auto"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{
                        "message": {
                            "role": "assistant",
                            "content": null,
                            "tool_calls": [
                                {
                                    "id": "call_a",
                                    "type": "function",
                                    "function": {"name": "read_file", "arguments": "{\"file_path\": \"a.txt\"}"}
                                },
                                {
                                    "id": "call_b",
                                    "type": "function",
                                    "function": {"name": "list_files", "arguments": "{oops"}
                                }
                            ]
                        }
                    }],
                    "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = InferenceClient::new(&server.url(), "test-key", "gpt-test");
        let resp = client
            .chat(&[ChatMessage::user("TASK: go")], &tool_definitions())
            .await
            .unwrap();
        mock.assert_async().await;

        assert_eq!(resp.content, None);
        assert_eq!(resp.tool_calls.len(), 2);
        assert_eq!(resp.tool_calls[0].name, "read_file");
        assert_eq!(resp.tool_calls[0].arguments, json!({"file_path": "a.txt"}));
        assert_eq!(resp.tool_calls[1].arguments, json!({}));
        assert_eq!(resp.usage.total_tokens, 15);
    }

    #[tokio::test]
    async fn test_chat_final_answer() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(
                json!({"choices": [{"message": {"role": "assistant", "content": "  CTF{done}\n"}}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let client = InferenceClient::new(&server.url(), "k", "m");
        let resp = client.chat(&[ChatMessage::user("q")], &[]).await.unwrap();
        assert_eq!(resp.content.as_deref(), Some("  CTF{done}\n"));
        assert!(resp.tool_calls.is_empty());
        assert_eq!(resp.usage, TokenUsage::default());
    }

    #[tokio::test]
    async fn test_chat_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("bad key")
            .create_async()
            .await;

        let client = InferenceClient::new(&server.url(), "k", "m");
        let err = client.chat(&[ChatMessage::user("q")], &[]).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("bad key"));
    }

    #[tokio::test]
    async fn test_chat_without_choices_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let client = InferenceClient::new(&server.url(), "k", "m");
        assert!(client.chat(&[ChatMessage::user("q")], &[]).await.is_err());
    }
}
