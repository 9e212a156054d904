//! Local filesystem tools: files, line ranges, block replacement, directories.

use super::args::{
    FindFilesRecursivelyArgs, ListFilesArgs, MakeDirectoryArgs, ReadFileArgs, ReadFileLinesArgs,
    RemoveDirectoryArgs, ReplaceCodeBlockArgs, WriteFileArgs,
};
use super::error::ToolError;
use super::registry::ToolKind;
use super::traits::Tool;
use super::ToolContext;
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

async fn is_file(path: &str) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

async fn is_dir(path: &str) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}

/// Create the parent directories of `path`, if it has any.
pub(crate) async fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent).await,
        _ => Ok(()),
    }
}

/// Lines `start_line..=end_line` (1-based) of `content`, clamped to the
/// lines that exist. Line terminators are kept.
pub fn slice_lines(content: &str, start_line: i64, end_line: i64) -> String {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let count = lines.len() as i64;
    let start = start_line.saturating_sub(1).clamp(0, count) as usize;
    let end = end_line.clamp(0, count) as usize;
    if start >= end {
        return String::new();
    }
    lines[start..end].concat()
}

/// Replace the lines strictly between the first line containing
/// `start_marker` and the first later line containing `end_marker`.
///
/// Returns `None` when either marker is missing. Repeated markers are not
/// detected: the first start marker wins.
pub fn replace_block(
    content: &str,
    start_marker: &str,
    end_marker: &str,
    new_content: &str,
) -> Option<String> {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let start = lines.iter().position(|line| line.contains(start_marker))?;
    let end = start
        + 1
        + lines[start + 1..]
            .iter()
            .position(|line| line.contains(end_marker))?;

    let mut out = String::with_capacity(content.len() + new_content.len() + 1);
    for line in &lines[..=start] {
        out.push_str(line);
    }
    out.push_str(new_content);
    out.push('\n');
    for line in &lines[end..] {
        out.push_str(line);
    }
    Some(out)
}

/// Paths of the regular files below `start` whose file name contains
/// `pattern`. Symlinks count when they point at a regular file.
fn find_matching(start: &str, pattern: &str) -> Vec<String> {
    WalkDir::new(start)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .filter(|entry| entry.file_name().to_string_lossy().contains(pattern))
        .map(|entry| entry.path().display().to_string())
        .collect()
}

#[async_trait]
impl Tool for ReadFileArgs {
    const KIND: ToolKind = ToolKind::ReadFile;

    async fn run(self, _ctx: &ToolContext) -> Result<String, ToolError> {
        if !is_file(&self.file_path).await {
            return Err(ToolError::NotAFile {
                path: self.file_path,
            });
        }
        let context = format!("Could not read file {}", self.file_path);
        let bytes = fs::read(&self.file_path)
            .await
            .map_err(|e| ToolError::failed(&context, e))?;
        String::from_utf8(bytes).map_err(|e| ToolError::failed(&context, e))
    }
}

#[async_trait]
impl Tool for ReadFileLinesArgs {
    const KIND: ToolKind = ToolKind::ReadFileLines;

    async fn run(self, _ctx: &ToolContext) -> Result<String, ToolError> {
        let bytes = fs::read(&self.file_path).await.map_err(|e| {
            ToolError::failed(
                format!(
                    "Could not read lines {}-{} from {}",
                    self.start_line, self.end_line, self.file_path
                ),
                e,
            )
        })?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(slice_lines(&content, self.start_line, self.end_line))
    }
}

#[async_trait]
impl Tool for WriteFileArgs {
    const KIND: ToolKind = ToolKind::WriteFile;

    async fn run(self, _ctx: &ToolContext) -> Result<String, ToolError> {
        let context = format!("Could not write to file {}", self.file_path);
        let path = Path::new(&self.file_path);
        ensure_parent_dir(path)
            .await
            .map_err(|e| ToolError::failed(&context, e))?;
        fs::write(path, self.content.as_bytes())
            .await
            .map_err(|e| ToolError::failed(&context, e))?;
        debug!("Wrote {} bytes to {}", self.content.len(), self.file_path);
        Ok(format!("Successfully written to {}", self.file_path))
    }
}

#[async_trait]
impl Tool for ReplaceCodeBlockArgs {
    const KIND: ToolKind = ToolKind::ReplaceCodeBlock;

    async fn run(self, _ctx: &ToolContext) -> Result<String, ToolError> {
        let context = format!("Failed to replace code block in {}", self.file_path);
        let content = fs::read_to_string(&self.file_path)
            .await
            .map_err(|e| ToolError::failed(&context, e))?;

        let Some(updated) = replace_block(
            &content,
            &self.start_marker,
            &self.end_marker,
            &self.new_content,
        ) else {
            return Err(ToolError::MarkersNotFound {
                start: self.start_marker,
                end: self.end_marker,
                path: self.file_path,
            });
        };

        fs::write(&self.file_path, updated)
            .await
            .map_err(|e| ToolError::failed(&context, e))?;
        Ok(format!(
            "Successfully replaced block between '{}' and '{}' in {}.",
            self.start_marker, self.end_marker, self.file_path
        ))
    }
}

#[async_trait]
impl Tool for ListFilesArgs {
    const KIND: ToolKind = ToolKind::ListFiles;

    async fn run(self, _ctx: &ToolContext) -> Result<String, ToolError> {
        if !is_dir(&self.directory_path).await {
            return Err(ToolError::NotADirectory {
                path: self.directory_path,
            });
        }
        let context = format!("Could not list files in {}", self.directory_path);
        let mut entries = fs::read_dir(&self.directory_path)
            .await
            .map_err(|e| ToolError::failed(&context, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ToolError::failed(&context, e))?
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        serde_json::to_string(&names).map_err(|e| ToolError::failed(&context, e))
    }
}

#[async_trait]
impl Tool for FindFilesRecursivelyArgs {
    const KIND: ToolKind = ToolKind::FindFilesRecursively;

    async fn run(self, _ctx: &ToolContext) -> Result<String, ToolError> {
        if !is_dir(&self.start_path).await {
            return Err(ToolError::NotADirectory {
                path: self.start_path,
            });
        }
        let context = format!("Could not search {}", self.start_path);
        let (start, pattern) = (self.start_path.clone(), self.pattern.clone());
        let found = tokio::task::spawn_blocking(move || find_matching(&start, &pattern))
            .await
            .map_err(|e| ToolError::failed(&context, e))?;

        if found.is_empty() {
            return Ok(format!(
                "No files found matching '{}' in '{}'.",
                self.pattern, self.start_path
            ));
        }
        serde_json::to_string(&found).map_err(|e| ToolError::failed(&context, e))
    }
}

#[async_trait]
impl Tool for MakeDirectoryArgs {
    const KIND: ToolKind = ToolKind::MakeDirectory;

    async fn run(self, _ctx: &ToolContext) -> Result<String, ToolError> {
        fs::create_dir_all(&self.path)
            .await
            .map_err(|e| ToolError::failed(format!("Failed to create directory {}", self.path), e))?;
        Ok(format!("Directory ensured to exist: {}", self.path))
    }
}

#[async_trait]
impl Tool for RemoveDirectoryArgs {
    const KIND: ToolKind = ToolKind::RemoveDirectory;

    async fn run(self, _ctx: &ToolContext) -> Result<String, ToolError> {
        if !is_dir(&self.path).await {
            return Err(ToolError::NotADirectory { path: self.path });
        }
        fs::remove_dir_all(&self.path)
            .await
            .map_err(|e| ToolError::failed(format!("Failed to remove directory {}", self.path), e))?;
        Ok(format!("Successfully removed directory: {}", self.path))
    }
}
