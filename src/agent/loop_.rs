//! Core ReAct agent loop: Think → Act → Observe.
//!
//! For one task the agent:
//! 1. Seeds the conversation with the system prompt and the task
//! 2. Calls inference with the full history and every tool
//! 3. Executes the requested tool calls, one at a time
//! 4. Repeats until the model answers without tool calls or the turn
//!    limit is reached

use crate::agent::context::Conversation;
use crate::agent::system_prompt;
use crate::inference::ChatModel;
use crate::tools::{self, ToolContext};
use crate::types::*;
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Answer returned when the turn limit is hit before a final answer.
pub const LOOP_LIMIT_MESSAGE: &str = "Agent stopped after reaching the maximum loop limit.";

/// Characters of assistant text shown in the turn log.
const LOG_PREVIEW_CHARS: usize = 200;

#[derive(Debug)]
enum LoopState {
    AwaitingModel,
    DispatchingTool(Vec<ToolCall>),
    Done(String),
}

/// Result of one task run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub answer: String,
    /// Model calls made.
    pub turns: u32,
    /// Tool calls dispatched.
    pub tool_calls: u32,
    pub usage: TokenUsage,
    pub conversation: Conversation,
}

fn preview(text: &str) -> String {
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}

/// Run `task` to completion.
///
/// Returns an error only when the model endpoint fails; tool failures are
/// fed back to the model as observations.
pub async fn run_task(
    model: &dyn ChatModel,
    tool_ctx: &ToolContext,
    task: &str,
    max_turns: u32,
) -> Result<RunReport> {
    info!("Starting task with model {} (max {} turns)", model.model_name(), max_turns);

    let tool_defs = tools::tool_definitions();
    let mut conversation =
        Conversation::seeded(&system_prompt::build_system_prompt(&tool_defs), task);

    let mut turns: u32 = 0;
    let mut tool_call_count: u32 = 0;
    let mut usage = TokenUsage::default();
    let mut state = LoopState::AwaitingModel;

    loop {
        state = match state {
            LoopState::AwaitingModel => {
                if turns >= max_turns {
                    warn!("Reached the loop limit of {} turns without an answer", max_turns);
                    return Ok(RunReport {
                        outcome: RunOutcome::LoopLimit,
                        answer: LOOP_LIMIT_MESSAGE.to_string(),
                        turns,
                        tool_calls: tool_call_count,
                        usage,
                        conversation,
                    });
                }
                turns += 1;

                debug!(
                    "[Turn {}] Sending {} messages ({} chars)",
                    turns,
                    conversation.len(),
                    conversation.char_count()
                );
                let response = model
                    .chat(conversation.messages(), &tool_defs)
                    .await
                    .with_context(|| format!("Model call failed on turn {}", turns))?;
                usage.add(&response.usage);

                let content = response.content.unwrap_or_default();
                if response.tool_calls.is_empty() {
                    conversation.push(ChatMessage::assistant(content.clone(), Vec::new()));
                    LoopState::Done(content.trim().to_string())
                } else {
                    if !content.trim().is_empty() {
                        info!("[Turn {}] Agent: {}", turns, preview(&content));
                    }
                    conversation.push(ChatMessage::assistant(content, response.tool_calls.clone()));
                    LoopState::DispatchingTool(response.tool_calls)
                }
            }

            LoopState::DispatchingTool(calls) => {
                for call in &calls {
                    info!("[Turn {}] Tool: {}({})", turns, call.name, call.arguments);

                    let result = tools::execute_tool(tool_ctx, call).await;
                    tool_call_count += 1;

                    if result.success {
                        info!("[Turn {}] Tool result: {} chars", turns, result.output.len());
                    } else {
                        warn!("[Turn {}] Tool error: {}", turns, preview(&result.output));
                    }

                    conversation.push(ChatMessage::tool_result(call, result.output));
                }
                LoopState::AwaitingModel
            }

            LoopState::Done(answer) => {
                info!(
                    "Task answered after {} turns and {} tool calls",
                    turns, tool_call_count
                );
                return Ok(RunReport {
                    outcome: RunOutcome::Answered,
                    answer,
                    turns,
                    tool_calls: tool_call_count,
                    usage,
                    conversation,
                });
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_respects_char_boundaries() {
        let text = "é".repeat(LOG_PREVIEW_CHARS + 10);
        assert_eq!(preview(&text).chars().count(), LOG_PREVIEW_CHARS);
    }
}
