//! Tool trait and the definition type exposed to the inference model.

use super::error::ToolError;
use super::registry::ToolKind;
use super::ToolContext;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Definition of a tool exposed to the inference model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A tool is its validated argument struct plus the effect it performs.
///
/// Implementors are deserialized from the model's argument object, so the
/// struct's fields are the tool's parameter signature.
#[async_trait]
pub trait Tool: DeserializeOwned + Send + Sized + 'static {
    /// Registry entry this argument struct belongs to.
    const KIND: ToolKind;

    /// Execute the tool. Failures are returned as [`ToolError`] and turned
    /// into an error observation by the dispatcher.
    async fn run(self, ctx: &ToolContext) -> Result<String, ToolError>;
}
