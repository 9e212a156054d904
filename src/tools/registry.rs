//! The closed set of tools and the schemas advertised to the model.

use super::traits::ToolDefinition;
use serde_json::{json, Value};
use std::fmt;

/// Every tool the agent can run. Dispatch is a `match` on this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    DownloadFile,
    GitClone,
    UnzipFile,
    ReadFile,
    ReadFileLines,
    WriteFile,
    ReplaceCodeBlock,
    RunPythonFile,
    RunShellCommand,
    ListFiles,
    FindFilesRecursively,
    MakeDirectory,
    RemoveDirectory,
    ScrapeHtmlContent,
}

impl ToolKind {
    /// All tools, in the order they are advertised.
    pub const ALL: [ToolKind; 14] = [
        ToolKind::DownloadFile,
        ToolKind::GitClone,
        ToolKind::UnzipFile,
        ToolKind::ReadFile,
        ToolKind::ReadFileLines,
        ToolKind::WriteFile,
        ToolKind::ReplaceCodeBlock,
        ToolKind::RunPythonFile,
        ToolKind::RunShellCommand,
        ToolKind::ListFiles,
        ToolKind::FindFilesRecursively,
        ToolKind::MakeDirectory,
        ToolKind::RemoveDirectory,
        ToolKind::ScrapeHtmlContent,
    ];

    /// Name used in function calls.
    pub fn name(self) -> &'static str {
        match self {
            Self::DownloadFile => "download_file",
            Self::GitClone => "git_clone",
            Self::UnzipFile => "unzip_file",
            Self::ReadFile => "read_file",
            Self::ReadFileLines => "read_file_lines",
            Self::WriteFile => "write_file",
            Self::ReplaceCodeBlock => "replace_code_block",
            Self::RunPythonFile => "run_python_file",
            Self::RunShellCommand => "run_shell_command",
            Self::ListFiles => "list_files",
            Self::FindFilesRecursively => "find_files_recursively",
            Self::MakeDirectory => "make_directory",
            Self::RemoveDirectory => "remove_directory",
            Self::ScrapeHtmlContent => "scrape_html_content",
        }
    }

    /// Look up a tool by the name the model used.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::DownloadFile => "Download a single file from a URL and save it locally.",
            Self::GitClone => {
                "Clone a git repository from a URL into a local directory. The standard way to get a codebase."
            }
            Self::UnzipFile => "Extract a .zip archive into a directory.",
            Self::ReadFile => "Read the entire content of a local file.",
            Self::ReadFileLines => {
                "Read a range of lines (1-based, inclusive) from a file. Useful for inspecting code around an error."
            }
            Self::WriteFile => {
                "Write or overwrite a file with the given content. Creates parent directories if needed."
            }
            Self::ReplaceCodeBlock => {
                "Replace the lines between a start marker line and an end marker line in a file. Both marker lines are kept. Markers should be unique."
            }
            Self::RunPythonFile => "Execute a Python script and return its stdout and stderr.",
            Self::RunShellCommand => {
                "Execute a shell command and return its stdout and stderr. Use with care. Useful for git, pip, builds and tests."
            }
            Self::ListFiles => "List the files and directories inside a folder.",
            Self::FindFilesRecursively => {
                "Find files under a directory whose file name contains a pattern."
            }
            Self::MakeDirectory => "Create a directory, including any missing parent directories.",
            Self::RemoveDirectory => {
                "Remove a directory and everything inside it. Use for cleaning up the workspace."
            }
            Self::ScrapeHtmlContent => "Fetch a web page and extract its visible text using a CSS selector.",
        }
    }

    /// JSON Schema for the tool's parameters.
    ///
    /// Must match the fields of the tool's argument struct in `args.rs`.
    pub fn parameters(self) -> Value {
        match self {
            Self::DownloadFile => json!({
                "type": "object",
                "properties": {
                    "url": { "type": "string", "description": "URL to download" },
                    "filename": { "type": "string", "description": "Local path to save the file to" }
                },
                "required": ["url", "filename"]
            }),
            Self::GitClone => json!({
                "type": "object",
                "properties": {
                    "repo_url": { "type": "string", "description": "Repository URL" },
                    "target_dir": { "type": "string", "description": "Directory to clone into" }
                },
                "required": ["repo_url", "target_dir"]
            }),
            Self::UnzipFile => json!({
                "type": "object",
                "properties": {
                    "zip_path": { "type": "string", "description": "Path to the .zip archive" },
                    "extract_to": { "type": "string", "description": "Destination directory" }
                },
                "required": ["zip_path", "extract_to"]
            }),
            Self::ReadFile => json!({
                "type": "object",
                "properties": {
                    "file_path": { "type": "string", "description": "Path to the file" }
                },
                "required": ["file_path"]
            }),
            Self::ReadFileLines => json!({
                "type": "object",
                "properties": {
                    "file_path": { "type": "string", "description": "Path to the file" },
                    "start_line": { "type": "integer", "description": "First line to read (1-based)" },
                    "end_line": { "type": "integer", "description": "Last line to read (inclusive)" }
                },
                "required": ["file_path", "start_line", "end_line"]
            }),
            Self::WriteFile => json!({
                "type": "object",
                "properties": {
                    "file_path": { "type": "string", "description": "Path to the file" },
                    "content": { "type": "string", "description": "Full new content of the file" }
                },
                "required": ["file_path", "content"]
            }),
            Self::ReplaceCodeBlock => json!({
                "type": "object",
                "properties": {
                    "file_path": { "type": "string", "description": "Path to the file" },
                    "start_marker": { "type": "string", "description": "Text found on the line before the block" },
                    "end_marker": { "type": "string", "description": "Text found on the line after the block" },
                    "new_content": { "type": "string", "description": "Replacement for the lines between the markers" }
                },
                "required": ["file_path", "start_marker", "end_marker", "new_content"]
            }),
            Self::RunPythonFile => json!({
                "type": "object",
                "properties": {
                    "file_path": { "type": "string", "description": "Path to the Python script" }
                },
                "required": ["file_path"]
            }),
            Self::RunShellCommand => json!({
                "type": "object",
                "properties": {
                    "command": { "type": "string", "description": "The shell command to execute" }
                },
                "required": ["command"]
            }),
            Self::ListFiles => json!({
                "type": "object",
                "properties": {
                    "directory_path": { "type": "string", "description": "Directory to list", "default": "." }
                },
                "required": []
            }),
            Self::FindFilesRecursively => json!({
                "type": "object",
                "properties": {
                    "start_path": { "type": "string", "description": "Directory to search from" },
                    "pattern": { "type": "string", "description": "Substring the file name must contain" }
                },
                "required": ["start_path", "pattern"]
            }),
            Self::MakeDirectory => json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Directory to create" }
                },
                "required": ["path"]
            }),
            Self::RemoveDirectory => json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Directory to remove" }
                },
                "required": ["path"]
            }),
            Self::ScrapeHtmlContent => json!({
                "type": "object",
                "properties": {
                    "url": { "type": "string", "description": "Page URL" },
                    "selector": { "type": "string", "description": "CSS selector of the elements to read", "default": "body" }
                },
                "required": ["url"]
            }),
        }
    }

    pub fn definition(self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().into(),
            description: self.description().into(),
            parameters: self.parameters(),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build the list of tool definitions exposed to the inference model.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    ToolKind::ALL.into_iter().map(ToolKind::definition).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique_and_round_trip() {
        let names: HashSet<&str> = ToolKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), ToolKind::ALL.len());
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ToolKind::from_name("rm_rf"), None);
    }

    #[test]
    fn test_required_fields_are_declared_properties() {
        for kind in ToolKind::ALL {
            let schema = kind.parameters();
            let properties = schema["properties"].as_object().unwrap();
            for required in schema["required"].as_array().unwrap() {
                let name = required.as_str().unwrap();
                assert!(
                    properties.contains_key(name),
                    "{} requires undeclared property {}",
                    kind,
                    name
                );
                assert!(properties[name].get("default").is_none());
            }
        }
    }

    #[test]
    fn test_definitions_cover_every_tool() {
        let defs = tool_definitions();
        assert_eq!(defs.len(), 14);
        assert_eq!(defs[0].name, "download_file");
        assert!(defs.iter().all(|d| !d.description.is_empty()));
    }
}
