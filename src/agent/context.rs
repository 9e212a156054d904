//! Message context for the agent loop.
//!
//! The conversation is an append-only log: it is seeded with the system
//! prompt and the task, and afterwards only grows. The whole log is sent
//! to the model on every turn.

use crate::types::*;
use serde::Serialize;
use tracing::debug;

/// Ordered, append-only message history of one task run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Start a conversation with the system prompt and the task as the
    /// first user turn.
    pub fn seeded(system_prompt: &str, task: &str) -> Self {
        let mut conversation = Self::default();
        conversation.push(ChatMessage::system(system_prompt));
        conversation.push(ChatMessage::user(format!("TASK: {}", task)));
        conversation
    }

    pub fn push(&mut self, message: ChatMessage) {
        debug!(
            "History +{} message ({} chars), {} total",
            message.role,
            message.content.len(),
            self.messages.len() + 1
        );
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Total characters of message text, a rough measure of context size.
    pub fn char_count(&self) -> usize {
        self.messages.iter().map(|m| m.content.chars().count()).sum()
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }
}
