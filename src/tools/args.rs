//! Typed argument structs, one per tool, and the validated invocation enum.

use super::error::ToolError;
use super::registry::ToolKind;
use super::traits::Tool;
use super::ToolContext;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadFileArgs {
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitCloneArgs {
    pub repo_url: String,
    pub target_dir: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnzipFileArgs {
    pub zip_path: String,
    pub extract_to: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadFileArgs {
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadFileLinesArgs {
    pub file_path: String,
    pub start_line: i64,
    pub end_line: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WriteFileArgs {
    pub file_path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplaceCodeBlockArgs {
    pub file_path: String,
    pub start_marker: String,
    pub end_marker: String,
    pub new_content: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunPythonFileArgs {
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunShellCommandArgs {
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListFilesArgs {
    #[serde(default = "default_directory_path")]
    pub directory_path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FindFilesRecursivelyArgs {
    pub start_path: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MakeDirectoryArgs {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveDirectoryArgs {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScrapeHtmlContentArgs {
    pub url: String,
    #[serde(default = "default_selector")]
    pub selector: String,
}

fn default_directory_path() -> String {
    ".".into()
}

fn default_selector() -> String {
    "body".into()
}

/// A tool call whose name resolved and whose arguments validated.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    DownloadFile(DownloadFileArgs),
    GitClone(GitCloneArgs),
    UnzipFile(UnzipFileArgs),
    ReadFile(ReadFileArgs),
    ReadFileLines(ReadFileLinesArgs),
    WriteFile(WriteFileArgs),
    ReplaceCodeBlock(ReplaceCodeBlockArgs),
    RunPythonFile(RunPythonFileArgs),
    RunShellCommand(RunShellCommandArgs),
    ListFiles(ListFilesArgs),
    FindFilesRecursively(FindFilesRecursivelyArgs),
    MakeDirectory(MakeDirectoryArgs),
    RemoveDirectory(RemoveDirectoryArgs),
    ScrapeHtmlContent(ScrapeHtmlContentArgs),
}

impl ToolInvocation {
    /// Validate `arguments` against the argument struct of `kind`.
    pub fn parse(kind: ToolKind, arguments: &Value) -> Result<Self, ToolError> {
        Ok(match kind {
            ToolKind::DownloadFile => Self::DownloadFile(decode(arguments)?),
            ToolKind::GitClone => Self::GitClone(decode(arguments)?),
            ToolKind::UnzipFile => Self::UnzipFile(decode(arguments)?),
            ToolKind::ReadFile => Self::ReadFile(decode(arguments)?),
            ToolKind::ReadFileLines => Self::ReadFileLines(decode(arguments)?),
            ToolKind::WriteFile => Self::WriteFile(decode(arguments)?),
            ToolKind::ReplaceCodeBlock => Self::ReplaceCodeBlock(decode(arguments)?),
            ToolKind::RunPythonFile => Self::RunPythonFile(decode(arguments)?),
            ToolKind::RunShellCommand => Self::RunShellCommand(decode(arguments)?),
            ToolKind::ListFiles => Self::ListFiles(decode(arguments)?),
            ToolKind::FindFilesRecursively => Self::FindFilesRecursively(decode(arguments)?),
            ToolKind::MakeDirectory => Self::MakeDirectory(decode(arguments)?),
            ToolKind::RemoveDirectory => Self::RemoveDirectory(decode(arguments)?),
            ToolKind::ScrapeHtmlContent => Self::ScrapeHtmlContent(decode(arguments)?),
        })
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            Self::DownloadFile(_) => DownloadFileArgs::KIND,
            Self::GitClone(_) => GitCloneArgs::KIND,
            Self::UnzipFile(_) => UnzipFileArgs::KIND,
            Self::ReadFile(_) => ReadFileArgs::KIND,
            Self::ReadFileLines(_) => ReadFileLinesArgs::KIND,
            Self::WriteFile(_) => WriteFileArgs::KIND,
            Self::ReplaceCodeBlock(_) => ReplaceCodeBlockArgs::KIND,
            Self::RunPythonFile(_) => RunPythonFileArgs::KIND,
            Self::RunShellCommand(_) => RunShellCommandArgs::KIND,
            Self::ListFiles(_) => ListFilesArgs::KIND,
            Self::FindFilesRecursively(_) => FindFilesRecursivelyArgs::KIND,
            Self::MakeDirectory(_) => MakeDirectoryArgs::KIND,
            Self::RemoveDirectory(_) => RemoveDirectoryArgs::KIND,
            Self::ScrapeHtmlContent(_) => ScrapeHtmlContentArgs::KIND,
        }
    }

    /// Run the underlying tool.
    pub async fn run(self, ctx: &ToolContext) -> Result<String, ToolError> {
        match self {
            Self::DownloadFile(args) => args.run(ctx).await,
            Self::GitClone(args) => args.run(ctx).await,
            Self::UnzipFile(args) => args.run(ctx).await,
            Self::ReadFile(args) => args.run(ctx).await,
            Self::ReadFileLines(args) => args.run(ctx).await,
            Self::WriteFile(args) => args.run(ctx).await,
            Self::ReplaceCodeBlock(args) => args.run(ctx).await,
            Self::RunPythonFile(args) => args.run(ctx).await,
            Self::RunShellCommand(args) => args.run(ctx).await,
            Self::ListFiles(args) => args.run(ctx).await,
            Self::FindFilesRecursively(args) => args.run(ctx).await,
            Self::MakeDirectory(args) => args.run(ctx).await,
            Self::RemoveDirectory(args) => args.run(ctx).await,
            Self::ScrapeHtmlContent(args) => args.run(ctx).await,
        }
    }
}

fn decode<T: Tool>(arguments: &Value) -> Result<T, ToolError> {
    let invalid = |reason: String| ToolError::InvalidArguments {
        tool: T::KIND.name(),
        reason,
        arguments: arguments.to_string(),
    };

    if !arguments.is_object() {
        return Err(invalid("arguments must be a JSON object".into()));
    }
    T::deserialize(arguments).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    /// Build an argument object from a tool's schema, filling every
    /// property (or only the required ones) with a value of the right type.
    fn sample_arguments(kind: ToolKind, required_only: bool) -> Value {
        let schema = kind.parameters();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        let mut args = Map::new();
        for (name, prop) in schema["properties"].as_object().unwrap() {
            if required_only && !required.contains(&name.as_str()) {
                continue;
            }
            let value = match prop["type"].as_str().unwrap() {
                "integer" => json!(3),
                _ => json!("sample"),
            };
            args.insert(name.clone(), value);
        }
        Value::Object(args)
    }

    #[test]
    fn test_schema_and_structs_agree() {
        for kind in ToolKind::ALL {
            let full = ToolInvocation::parse(kind, &sample_arguments(kind, false));
            assert!(full.is_ok(), "{kind}: full schema rejected: {full:?}");
            assert_eq!(full.unwrap().kind(), kind);

            let minimal = ToolInvocation::parse(kind, &sample_arguments(kind, true));
            assert!(minimal.is_ok(), "{kind}: required-only schema rejected");
        }
    }

    #[test]
    fn test_defaults_apply() {
        let inv = ToolInvocation::parse(ToolKind::ListFiles, &json!({})).unwrap();
        assert_eq!(
            inv,
            ToolInvocation::ListFiles(ListFilesArgs {
                directory_path: ".".into()
            })
        );

        let inv =
            ToolInvocation::parse(ToolKind::ScrapeHtmlContent, &json!({"url": "http://x"})).unwrap();
        match inv {
            ToolInvocation::ScrapeHtmlContent(args) => assert_eq!(args.selector, "body"),
            other => panic!("unexpected invocation {other:?}"),
        }
    }

    #[test]
    fn test_missing_field_is_invalid() {
        let err = ToolInvocation::parse(ToolKind::ReadFile, &json!({})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { tool: "read_file", .. }));
        assert!(err.to_string().contains("file_path"));
    }

    #[test]
    fn test_extra_field_is_invalid() {
        let err = ToolInvocation::parse(
            ToolKind::MakeDirectory,
            &json!({"path": "a", "mode": "0755"}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("mode"));
    }

    #[test]
    fn test_mistyped_field_is_invalid() {
        let err = ToolInvocation::parse(
            ToolKind::ReadFileLines,
            &json!({"file_path": "a", "start_line": "one", "end_line": 2}),
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn test_non_object_arguments_are_invalid() {
        let err = ToolInvocation::parse(ToolKind::ReadFile, &json!(["a.txt"])).unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }
}
