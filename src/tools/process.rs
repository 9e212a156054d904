//! Subprocess tools: Python scripts, shell commands, git clone.
//!
//! Every child runs with a fixed timeout and is killed if it overruns.
//! A non-zero exit status is reported through the captured output, not as
//! a tool failure (except for `git clone`).

use super::args::{GitCloneArgs, RunPythonFileArgs, RunShellCommandArgs};
use super::error::ToolError;
use super::registry::ToolKind;
use super::traits::Tool;
use super::ToolContext;
use async_trait::async_trait;
use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

pub const PYTHON_TIMEOUT: Duration = Duration::from_secs(30);
pub const SHELL_TIMEOUT: Duration = Duration::from_secs(60);
pub const GIT_CLONE_TIMEOUT: Duration = Duration::from_secs(120);

/// Run `command` to completion with piped output, killing it after `limit`.
async fn output_with_timeout(mut command: Command, limit: Duration) -> io::Result<Output> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match tokio::time::timeout(limit, command.output()).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("timed out after {} seconds", limit.as_secs()),
        )),
    }
}

/// Combine captured streams into a labeled block.
pub fn format_output(stdout: &str, stderr: &str, when_empty: &str) -> String {
    let mut output = String::new();
    if !stdout.is_empty() {
        output.push_str(&format!("[STDOUT]:\n{}\n", stdout));
    }
    if !stderr.is_empty() {
        output.push_str(&format!("[STDERR]:\n{}\n", stderr));
    }
    if output.is_empty() {
        when_empty.to_string()
    } else {
        output.trim().to_string()
    }
}

fn shell_command(script: &str) -> Command {
    let (shell, flag) = if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    };
    let mut command = Command::new(shell);
    command.arg(flag).arg(script);
    command
}

#[async_trait]
impl Tool for RunPythonFileArgs {
    const KIND: ToolKind = ToolKind::RunPythonFile;

    async fn run(self, ctx: &ToolContext) -> Result<String, ToolError> {
        info!("Running script: {} {}", ctx.python_interpreter, self.file_path);
        let mut command = Command::new(&ctx.python_interpreter);
        command.arg(&self.file_path);

        let output = output_with_timeout(command, PYTHON_TIMEOUT)
            .await
            .map_err(|e| {
                ToolError::failed(
                    format!("An unexpected error occurred while running {}", self.file_path),
                    e,
                )
            })?;
        debug!("Script exited with {:?}", output.status.code());

        Ok(format_output(
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
            "Script ran with no output.",
        ))
    }
}

#[async_trait]
impl Tool for RunShellCommandArgs {
    const KIND: ToolKind = ToolKind::RunShellCommand;

    async fn run(self, _ctx: &ToolContext) -> Result<String, ToolError> {
        info!("Executing command: {}", self.command);
        let output = output_with_timeout(shell_command(&self.command), SHELL_TIMEOUT)
            .await
            .map_err(|e| {
                ToolError::failed(format!("Failed to run shell command '{}'", self.command), e)
            })?;
        debug!("Command exited with {:?}", output.status.code());

        Ok(format_output(
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
            "Command ran with no output.",
        ))
    }
}

#[async_trait]
impl Tool for GitCloneArgs {
    const KIND: ToolKind = ToolKind::GitClone;

    async fn run(self, _ctx: &ToolContext) -> Result<String, ToolError> {
        info!("Cloning {} into {}", self.repo_url, self.target_dir);
        let mut command = Command::new("git");
        command
            .args(["clone", self.repo_url.as_str(), self.target_dir.as_str()])
            .env("GIT_TERMINAL_PROMPT", "0");

        let output = match output_with_timeout(command, GIT_CLONE_TIMEOUT).await {
            Ok(output) => output,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ToolError::GitNotFound),
            Err(e) => {
                return Err(ToolError::failed(
                    "An unexpected error occurred during git clone",
                    e,
                ))
            }
        };

        if !output.status.success() {
            return Err(ToolError::GitFailed {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(format!(
            "Repository {} cloned into {}",
            self.repo_url, self.target_dir
        ))
    }
}
