//! Run transcript export.
//!
//! A transcript is written once after a run finishes. It is never read
//! back; runs do not resume.

use crate::agent::loop_::RunReport;
use crate::types::*;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub id: String,
    pub model: String,
    pub task: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    pub answer: String,
    pub turns: u32,
    pub tool_calls: u32,
    pub usage: TokenUsage,
    pub messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new(model: &str, task: &str, started_at: DateTime<Utc>, report: &RunReport) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            model: model.to_string(),
            task: task.to_string(),
            started_at,
            finished_at: Utc::now(),
            outcome: report.outcome,
            answer: report.answer.clone(),
            turns: report.turns,
            tool_calls: report.tool_calls,
            usage: report.usage,
            messages: report.conversation.messages().to_vec(),
        }
    }

    /// Write the transcript as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize transcript")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write transcript to {}", path.display()))?;
        info!("Transcript {} saved to {}", self.id, path.display());
        Ok(())
    }
}
