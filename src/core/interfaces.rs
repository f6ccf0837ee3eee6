use crate::core::models::*;
use crate::utils::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// File system operations interface
#[async_trait]
pub trait FileSystemService: Send + Sync {
    /// Recursively collect stylesheets under `path`, skipping `exclude_dirs`
    async fn scan_css_files(&self, path: &Path, exclude_dirs: &[PathBuf]) -> Result<Vec<PathBuf>>;
    async fn read_file(&self, path: &Path) -> Result<String>;
    async fn write_file(&self, path: &Path, content: &str) -> Result<()>;
    async fn create_directory(&self, path: &Path) -> Result<()>;
}

/// A step in the optimization chain that rewrites emitted assets
#[async_trait]
pub trait Minimizer: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the assets in the same order they were given
    async fn minimize(&self, assets: Vec<Asset>) -> Result<Vec<Asset>>;

    /// Serializable view of the step and its options, used by `inspect`
    fn describe(&self) -> serde_json::Value;
}

/// Build service interface
#[async_trait]
pub trait BuildService: Send + Sync {
    async fn build(&self, config: &BuildConfig) -> Result<BuildResult>;
}
