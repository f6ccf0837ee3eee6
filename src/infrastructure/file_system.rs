use crate::core::interfaces::FileSystemService;
use crate::utils::{Result, SokuError};
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct TokioFileSystemService;

/// Directories never scanned for sources
const SKIPPED_DIRS: &[&str] = &["node_modules", "target"];

fn is_skipped(path: &Path, exclude_dirs: &[PathBuf]) -> bool {
    let hidden_or_vendored = path
        .file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.') || SKIPPED_DIRS.contains(&name))
        .unwrap_or(false);

    hidden_or_vendored || exclude_dirs.iter().any(|dir| path.starts_with(dir))
}

#[async_trait::async_trait]
impl FileSystemService for TokioFileSystemService {
    async fn scan_css_files(&self, path: &Path, exclude_dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut css_files = Vec::new();
        let mut pending = vec![path.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await.map_err(SokuError::Io)?;

            while let Some(entry) = entries.next_entry().await.map_err(SokuError::Io)? {
                let path = entry.path();
                let file_type = entry.file_type().await.map_err(SokuError::Io)?;

                if file_type.is_dir() {
                    if !is_skipped(&path, exclude_dirs) {
                        pending.push(path);
                    }
                    continue;
                }

                let is_css = path
                    .extension()
                    .and_then(|s| s.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("css"))
                    .unwrap_or(false);

                if file_type.is_file() && is_css {
                    css_files.push(path);
                }
            }
        }

        css_files.sort();
        Ok(css_files)
    }

    async fn read_file(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).await.map_err(SokuError::Io)
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            self.create_directory(parent).await?;
        }

        fs::write(path, content).await.map_err(SokuError::Io)
    }

    async fn create_directory(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).await.map_err(SokuError::Io)
    }
}
