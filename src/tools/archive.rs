//! Zip archive extraction.

use super::args::UnzipFileArgs;
use super::error::ToolError;
use super::registry::ToolKind;
use super::traits::Tool;
use super::ToolContext;
use async_trait::async_trait;
use std::fs::File;
use std::path::Path;
use tracing::info;
use zip::result::ZipResult;
use zip::ZipArchive;

/// Extract every entry of the archive at `zip_path` below `dest`.
///
/// Entries whose names would escape `dest` are rejected by the zip crate.
fn extract_archive(zip_path: &Path, dest: &Path) -> ZipResult<usize> {
    let file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(file)?;
    std::fs::create_dir_all(dest)?;
    archive.extract(dest)?;
    Ok(archive.len())
}

#[async_trait]
impl Tool for UnzipFileArgs {
    const KIND: ToolKind = ToolKind::UnzipFile;

    async fn run(self, _ctx: &ToolContext) -> Result<String, ToolError> {
        let context = format!("Failed to unzip {}", self.zip_path);
        let (zip_path, dest) = (self.zip_path.clone(), self.extract_to.clone());

        let entries =
            tokio::task::spawn_blocking(move || extract_archive(Path::new(&zip_path), Path::new(&dest)))
                .await
                .map_err(|e| ToolError::failed(&context, e))?
                .map_err(|e| ToolError::failed(&context, e))?;

        info!("Extracted {} entries from {}", entries, self.zip_path);
        Ok(format!("Extracted {} to {}", self.zip_path, self.extract_to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, body) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn test_unzip_extracts_nested_entries() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("data.zip");
        write_zip(&zip_path, &[("flag.txt", "CTF{zip}"), ("nested/readme.md", "# hi")]);
        let out = dir.path().join("out");

        let msg = UnzipFileArgs {
            zip_path: zip_path.display().to_string(),
            extract_to: out.display().to_string(),
        }
        .run(&ToolContext::default())
        .await
        .unwrap();

        assert!(msg.contains(&out.display().to_string()));
        assert_eq!(std::fs::read_to_string(out.join("flag.txt")).unwrap(), "CTF{zip}");
        assert_eq!(std::fs::read_to_string(out.join("nested/readme.md")).unwrap(), "# hi");
    }

    #[tokio::test]
    async fn test_unzip_corrupt_archive_is_error() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("broken.zip");
        std::fs::write(&zip_path, b"this is not a zip archive").unwrap();

        let err = UnzipFileArgs {
            zip_path: zip_path.display().to_string(),
            extract_to: dir.path().join("out").display().to_string(),
        }
        .run(&ToolContext::default())
        .await
        .unwrap_err();
        assert!(err.to_string().starts_with("Failed to unzip"));
    }

    #[tokio::test]
    async fn test_unzip_missing_archive_is_error() {
        let err = UnzipFileArgs {
            zip_path: "no-such.zip".into(),
            extract_to: "out".into(),
        }
        .run(&ToolContext::default())
        .await
        .unwrap_err();
        assert!(err.to_observation().starts_with("[ERROR] Failed to unzip no-such.zip"));
    }
}
