//! Tool error taxonomy.
//!
//! The `Display` text of each variant is the human-readable part of an
//! error observation; the dispatcher prefixes it with [`ERROR_MARKER`].

use std::fmt;
use thiserror::Error;

/// Fixed prefix of every failed observation.
pub const ERROR_MARKER: &str = "[ERROR]";

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Function '{name}' is not an available tool.")]
    UnknownTool { name: String },

    #[error("Invalid arguments for {tool}: {reason}. Arguments: {arguments}")]
    InvalidArguments {
        tool: &'static str,
        reason: String,
        arguments: String,
    },

    #[error("Path is not a file: {path}")]
    NotAFile { path: String },

    #[error("Path '{path}' is not a valid directory.")]
    NotADirectory { path: String },

    #[error("Markers not found. Could not find '{start}' and '{end}' in {path}.")]
    MarkersNotFound {
        start: String,
        end: String,
        path: String,
    },

    #[error("Git command not found. Is Git installed and in your PATH?")]
    GitNotFound,

    #[error("Git clone failed. STDERR: {stderr}")]
    GitFailed { stderr: String },

    #[error("{context}. Error: {message}")]
    Failed { context: String, message: String },

    #[error("Failed to execute {tool} with args {arguments}. Error: {message}")]
    Crashed {
        tool: String,
        arguments: String,
        message: String,
    },
}

impl ToolError {
    /// A failure described by what was attempted and the underlying cause.
    pub fn failed(context: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self::Failed {
            context: context.into(),
            message: cause.to_string(),
        }
    }

    /// The observation text for this error.
    pub fn to_observation(&self) -> String {
        format!("{} {}", ERROR_MARKER, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_starts_with_marker() {
        let err = ToolError::NotAFile {
            path: "missing.txt".into(),
        };
        let obs = err.to_observation();
        assert!(obs.starts_with(ERROR_MARKER));
        assert!(obs.contains("missing.txt"));
    }

    #[test]
    fn test_unknown_tool_names_the_tool() {
        let err = ToolError::UnknownTool {
            name: "launch_rockets".into(),
        };
        assert_eq!(
            err.to_string(),
            "Function 'launch_rockets' is not an available tool."
        );
    }

    #[test]
    fn test_failed_joins_context_and_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ToolError::failed("Could not write to file /x", io);
        assert_eq!(err.to_string(), "Could not write to file /x. Error: denied");
    }
}
