use std::path::PathBuf;
use thiserror::Error;

/// Where a failure happened, when it can be pinned to a file
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub file_path: Option<PathBuf>,
    pub environment: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: PathBuf) -> Self {
        self.file_path = Some(path);
        self
    }

    pub fn with_environment(mut self, name: impl Into<String>) -> Self {
        self.environment = Some(name.into());
        self
    }
}

#[derive(Error, Debug)]
pub enum SokuError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Plugin {plugin} failed: {message}")]
    Plugin { plugin: String, message: String },

    #[error("Failed to minify {asset}: {message}")]
    Minify { asset: String, message: String },

    #[error("Build error: {message}")]
    Build {
        message: String,
        context: Option<ErrorContext>,
    },

    #[error("{0}")]
    Other(String),
}

impl SokuError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn plugin(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Plugin {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    pub fn minify(asset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Minify {
            asset: asset.into(),
            message: message.into(),
        }
    }

    /// Create a build error with context
    pub fn build_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Build {
            message: message.into(),
            context: Some(context),
        }
    }

    /// Format error with enhanced context display
    pub fn format_detailed(&self) -> String {
        match self {
            SokuError::Build {
                message,
                context: Some(ctx),
            } => {
                let mut output = format!("❌ Build Error: {}", message);
                if let Some(ref env) = ctx.environment {
                    output.push_str(&format!("\n🌐 Environment: {}", env));
                }
                if let Some(ref file_path) = ctx.file_path {
                    output.push_str(&format!("\n📁 File: {}", file_path.display()));
                }
                output
            }
            _ => format!("❌ {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SokuError>;

impl From<regex::Error> for SokuError {
    fn from(err: regex::Error) -> Self {
        SokuError::config(format!("Invalid asset pattern: {}", err))
    }
}

impl From<serde_json::Error> for SokuError {
    fn from(err: serde_json::Error) -> Self {
        SokuError::config(format!("Invalid JSON: {}", err))
    }
}

impl From<anyhow::Error> for SokuError {
    fn from(err: anyhow::Error) -> Self {
        SokuError::Other(format!("{:#}", err))
    }
}
