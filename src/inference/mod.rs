//! Chat-model access.
//!
//! The agent loop talks to a [`ChatModel`]; [`InferenceClient`] is the
//! OpenAI-compatible HTTP implementation.

pub mod client;

pub use client::InferenceClient;

use crate::tools::ToolDefinition;
use crate::types::{ChatMessage, InferenceResponse};
use anyhow::Result;
use async_trait::async_trait;

/// A chat-completion endpoint that supports tool calling.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, for logs and transcripts.
    fn model_name(&self) -> &str;

    /// Send the full history and the available tools; return the reply.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<InferenceResponse>;
}
