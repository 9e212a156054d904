pub mod archive;
pub mod args;
pub mod error;
pub mod fs;
pub mod net;
pub mod process;
pub mod registry;
pub mod traits;

pub use args::ToolInvocation;
pub use error::{ToolError, ERROR_MARKER};
pub use registry::{tool_definitions, ToolKind};
pub use traits::{Tool, ToolDefinition};

use crate::config::AgentConfig;
use crate::types::{ToolCall, ToolResult};
use anyhow::{Context, Result};
use std::future::Future;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Tool execution engine
// ---------------------------------------------------------------------------

/// Handles shared by tool executions. Tools keep no state of their own.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub http: reqwest::Client,
    pub python_interpreter: String,
}

impl ToolContext {
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ctf-agent/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for tools")?;
        Ok(Self {
            http,
            python_interpreter: config.python_interpreter.clone(),
        })
    }
}

impl Default for ToolContext {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
            python_interpreter: AgentConfig::default().python_interpreter,
        }
    }
}

/// Execute a tool call by name.
///
/// Never fails: an unknown name, invalid arguments, a tool error, or a
/// panic inside the tool all come back as an error observation.
pub async fn execute_tool(ctx: &ToolContext, call: &ToolCall) -> ToolResult {
    let result = match ToolKind::from_name(&call.name) {
        None => Err(ToolError::UnknownTool {
            name: call.name.clone(),
        }),
        Some(kind) => match ToolInvocation::parse(kind, &call.arguments) {
            Ok(invocation) => run_isolated(ctx, invocation, &call.arguments).await,
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(output) => {
            debug!("Tool {} succeeded ({} chars)", call.name, output.len());
            ToolResult {
                tool_call_id: call.id.clone(),
                output,
                success: true,
            }
        }
        Err(e) => {
            warn!("Tool {} failed: {}", call.name, e);
            ToolResult {
                tool_call_id: call.id.clone(),
                output: e.to_observation(),
                success: false,
            }
        }
    }
}

/// Run the invocation on its own task so that a panic is contained.
async fn run_isolated(
    ctx: &ToolContext,
    invocation: ToolInvocation,
    arguments: &serde_json::Value,
) -> Result<String, ToolError> {
    let kind = invocation.kind();
    let ctx = ctx.clone();
    contain(kind, arguments, async move { invocation.run(&ctx).await }).await
}

/// Await `fut` on a spawned task; a panic becomes [`ToolError::Crashed`].
async fn contain<F>(
    kind: ToolKind,
    arguments: &serde_json::Value,
    fut: F,
) -> Result<String, ToolError>
where
    F: Future<Output = Result<String, ToolError>> + Send + 'static,
{
    match tokio::spawn(fut).await {
        Ok(result) => result,
        Err(join_error) => Err(ToolError::Crashed {
            tool: kind.name().to_string(),
            arguments: arguments.to_string(),
            message: join_error.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "call_1".into(),
            name: name.into(),
            arguments,
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_yields_error_observation() {
        let result = execute_tool(&ToolContext::default(), &call("format_disk", json!({}))).await;
        assert!(!result.success);
        assert_eq!(result.tool_call_id, "call_1");
        assert!(result.output.starts_with(ERROR_MARKER));
        assert!(result.output.contains("format_disk"));
    }

    #[tokio::test]
    async fn test_invalid_arguments_yield_error_observation() {
        let result = execute_tool(
            &ToolContext::default(),
            &call("write_file", json!({"file_path": "x.txt"})),
        )
        .await;
        assert!(!result.success);
        assert!(result.output.starts_with("[ERROR] Invalid arguments for write_file"));
        assert!(result.output.contains("content"));
    }

    #[tokio::test]
    async fn test_successful_dispatch() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("note.txt");
        std::fs::write(&file, "a\nb\nc\n").unwrap();

        let result = execute_tool(
            &ToolContext::default(),
            &call(
                "read_file_lines",
                json!({"file_path": file.display().to_string(), "start_line": 2, "end_line": 2}),
            ),
        )
        .await;
        assert!(result.success);
        assert_eq!(result.output, "b\n");
    }

    #[tokio::test]
    async fn test_tool_failure_is_marked() {
        let result = execute_tool(
            &ToolContext::default(),
            &call("read_file", json!({"file_path": "/no/such/file.txt"})),
        )
        .await;
        assert!(!result.success);
        assert_eq!(result.output, "[ERROR] Path is not a file: /no/such/file.txt");
    }

    async fn exploding_tool() -> Result<String, ToolError> {
        panic!("tool blew up");
    }

    #[tokio::test]
    async fn test_panicking_tool_is_contained() {
        let arguments = json!({"command": "boom"});
        let err = contain(ToolKind::RunShellCommand, &arguments, exploding_tool())
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Crashed { .. }));
        let observation = err.to_observation();
        assert!(observation.starts_with("[ERROR] Failed to execute run_shell_command with args "));
        assert!(observation.contains(&arguments.to_string()));
        assert!(observation.contains("panicked"));
    }

    #[tokio::test]
    async fn test_contain_passes_results_through() {
        let ok = contain(ToolKind::ListFiles, &json!({}), async { Ok::<_, ToolError>("[]".to_string()) }).await;
        assert_eq!(ok.unwrap(), "[]");
    }
}
