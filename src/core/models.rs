use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Build mode of the host bundler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Production,
    Development,
    None,
}

impl BuildMode {
    pub fn is_prod(&self) -> bool {
        matches!(self, BuildMode::Production)
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, BuildMode::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Production => "production",
            BuildMode::Development => "development",
            BuildMode::None => "none",
        }
    }
}

/// `output.minify`: either a switch for everything or per asset type flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinifyConfig {
    Enabled(bool),
    Options(MinifyOptions),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinifyOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub js: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<bool>,
}

impl MinifyConfig {
    /// An object without a `css` flag does not enable CSS minification
    pub fn css_enabled(&self) -> bool {
        match self {
            MinifyConfig::Enabled(enabled) => *enabled,
            MinifyConfig::Options(options) => options.css.unwrap_or(false),
        }
    }
}

impl Default for MinifyConfig {
    fn default() -> Self {
        MinifyConfig::Enabled(true)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    #[serde(default = "default_dist_path")]
    pub dist_path: PathBuf,
    #[serde(default)]
    pub minify: MinifyConfig,
}

fn default_dist_path() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dist_path: default_dist_path(),
            minify: MinifyConfig::default(),
        }
    }
}

/// Per-environment overrides of the top level output settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minify: Option<MinifyConfig>,
}

/// Resolved settings for one environment being built
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentContext {
    pub name: String,
    pub output: OutputConfig,
}

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub root: PathBuf,
    pub mode: BuildMode,
    pub output: OutputConfig,
    pub environments: IndexMap<String, EnvironmentConfig>,
}

pub const DEFAULT_ENVIRONMENT: &str = "web";

impl BuildConfig {
    pub fn new(root: PathBuf, mode: BuildMode) -> Self {
        Self {
            root,
            mode,
            output: OutputConfig::default(),
            environments: IndexMap::new(),
        }
    }

    /// Expand into one context per environment.
    ///
    /// Without declared environments a single `web` environment is built.
    /// With several, each one writes to its own subdirectory unless it sets
    /// `distPath` itself.
    pub fn resolve_environments(&self) -> Vec<EnvironmentContext> {
        if self.environments.is_empty() {
            return vec![EnvironmentContext {
                name: DEFAULT_ENVIRONMENT.to_string(),
                output: self.output.clone(),
            }];
        }

        let split_output = self.environments.len() > 1;
        self.environments
            .iter()
            .map(|(name, env)| {
                let dist_path = match &env.dist_path {
                    Some(path) => path.clone(),
                    None if split_output => self.output.dist_path.join(name),
                    None => self.output.dist_path.clone(),
                };
                EnvironmentContext {
                    name: name.clone(),
                    output: OutputConfig {
                        dist_path,
                        minify: env.minify.clone().unwrap_or_else(|| self.output.minify.clone()),
                    },
                }
            })
            .collect()
    }
}

/// A file flowing through the minimizer chain
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// Path relative to the project root, with `/` separators
    pub name: String,
    pub source: String,
}

impl Asset {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: PathBuf,
    pub content: String,
    pub size: usize,
}

#[derive(Debug, Clone, Default)]
pub struct EnvironmentResult {
    pub name: String,
    /// Minimizer slots installed in this environment's chain, in run order
    pub minimizers: Vec<String>,
    pub output_files: Vec<OutputFile>,
}

#[derive(Debug, Default)]
pub struct BuildResult {
    pub environments: Vec<EnvironmentResult>,
    pub build_time: std::time::Duration,
    pub success: bool,
}

impl BuildResult {
    pub fn output_files(&self) -> impl Iterator<Item = &OutputFile> {
        self.environments.iter().flat_map(|env| env.output_files.iter())
    }
}
