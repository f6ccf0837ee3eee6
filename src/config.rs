use crate::core::models::{BuildConfig, BuildMode, EnvironmentConfig, OutputConfig};
use crate::plugins::{MinifierSelection, PluginCssMinimizerOptions};
use crate::utils::{Logger, Result, SokuError};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "soku.config.json";

/// Configuration file format (soku.config.json)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SokuConfig {
    /// Build mode (default: "production")
    #[serde(default)]
    pub mode: Option<BuildMode>,

    /// Output directory and minification switches
    #[serde(default)]
    pub output: Option<OutputConfig>,

    /// Named build environments, each assembled with its own chain
    #[serde(default)]
    pub environments: IndexMap<String, EnvironmentConfig>,

    /// Options for the CSS minimizer plugin
    #[serde(default)]
    pub css_minimizer: Option<PluginCssMinimizerOptions>,
}

/// Everything a build needs after file and CLI settings are merged
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub build: BuildConfig,
    pub css_minimizer: PluginCssMinimizerOptions,
}

/// Config loader that supports config files with CLI override
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file if it exists
    /// Searches for soku.config.json in the project root
    pub fn load_from_file(root: &Path) -> Result<Option<SokuConfig>> {
        let config_path = root.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            Logger::debug(&format!("No {} found, using defaults", CONFIG_FILE_NAME));
            return Ok(None);
        }

        Logger::debug(&format!("Loading config from {}", config_path.display()));

        let content = std::fs::read_to_string(&config_path).map_err(SokuError::Io)?;

        let config: SokuConfig = serde_json::from_str(&content).map_err(|e| {
            SokuError::config(format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e))
        })?;

        Logger::debug("✅ Config file loaded successfully");
        Ok(Some(config))
    }

    /// Merge file config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(
        file_config: Option<SokuConfig>,
        root: PathBuf,
        mode: Option<BuildMode>,
        minifier: Option<MinifierSelection>,
    ) -> ProjectConfig {
        let base = file_config.unwrap_or_default();

        let mut css_minimizer = base.css_minimizer.unwrap_or_default();
        if let Some(minifier) = minifier {
            css_minimizer.minifier = minifier;
        }

        ProjectConfig {
            build: BuildConfig {
                root,
                mode: mode.or(base.mode).unwrap_or_default(),
                output: base.output.unwrap_or_default(),
                environments: base.environments,
            },
            css_minimizer,
        }
    }

    /// Load the file under `root` and apply CLI overrides
    pub fn load(
        root: &Path,
        mode: Option<BuildMode>,
        minifier: Option<MinifierSelection>,
    ) -> Result<ProjectConfig> {
        let file_config = Self::load_from_file(root)?;
        Ok(Self::merge_with_cli(file_config, root.to_path_buf(), mode, minifier))
    }

    /// Generate example config file
    pub fn generate_example() -> String {
        let example = serde_json::json!({
            "mode": "production",
            "output": {
                "distPath": "dist",
                "minify": { "js": true, "css": true }
            },
            "cssMinimizer": {
                "minifier": "lightningcss",
                "lightningCssOptions": {
                    "minimizerOptions": {
                        "targets": ["> 0.25%", "not dead"],
                        "drafts": { "nesting": true }
                    }
                }
            }
        });
        serde_json::to_string_pretty(&example).unwrap_or_default()
    }
}
