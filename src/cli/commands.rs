use crate::config::{ConfigLoader, ProjectConfig, CONFIG_FILE_NAME};
use crate::core::{interfaces::BuildService, models::BuildMode, services::CssBuildService};
use crate::infrastructure::TokioFileSystemService;
use crate::plugins::{plugin_css_minimizer, MinifierSelection};
use crate::utils::{Logger, Result, SokuError};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "soku-css-minimizer")]
#[command(about = "CSS minification for Soku builds with cssnano or Lightning CSS")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Minify the project's stylesheets into the output directory
    Build {
        /// Root directory
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        /// Build mode (overrides soku.config.json)
        #[arg(short, long, value_enum)]
        mode: Option<BuildMode>,
        /// CSS minifier backend (overrides soku.config.json)
        #[arg(long, value_enum)]
        minifier: Option<MinifierSelection>,
    },
    /// Print the assembled optimization chain of every environment
    Inspect {
        /// Root directory
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        #[arg(short, long, value_enum)]
        mode: Option<BuildMode>,
        #[arg(long, value_enum)]
        minifier: Option<MinifierSelection>,
    },
    /// Write an example soku.config.json
    Init {
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

pub struct CliHandler;

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(&self) -> Result<()> {
        // Initialize logging
        Logger::init();

        let cli = Cli::parse();

        match cli.command {
            Commands::Build {
                root,
                mode,
                minifier,
            } => self.handle_build_command(&root, mode, minifier).await,
            Commands::Inspect {
                root,
                mode,
                minifier,
            } => self.handle_inspect_command(&root, mode, minifier).await,
            Commands::Init { root } => self.handle_init_command(&root),
        }
    }

    fn build_service(project: &ProjectConfig) -> CssBuildService {
        CssBuildService::new(Arc::new(TokioFileSystemService))
            .with_plugin(plugin_css_minimizer(Some(project.css_minimizer.clone())))
    }

    async fn handle_build_command(
        &self,
        root: &Path,
        mode: Option<BuildMode>,
        minifier: Option<MinifierSelection>,
    ) -> Result<()> {
        let project = ConfigLoader::load(root, mode, minifier)?;
        let service = Self::build_service(&project);

        let result = service.build(&project.build).await?;
        for environment in &result.environments {
            Logger::info(&format!(
                "  • {}: {} files, minimizers [{}]",
                environment.name,
                environment.output_files.len(),
                environment.minimizers.join(", ")
            ));
        }

        Ok(())
    }

    async fn handle_inspect_command(
        &self,
        root: &Path,
        mode: Option<BuildMode>,
        minifier: Option<MinifierSelection>,
    ) -> Result<()> {
        let project = ConfigLoader::load(root, mode, minifier)?;
        let service = Self::build_service(&project);

        let chains = service.assemble_chains(&project.build).await?;
        let described: Map<String, Value> = chains
            .iter()
            .map(|c| (c.environment.name.clone(), c.chain.describe()))
            .collect();

        println!("{}", serde_json::to_string_pretty(&described)?);
        Ok(())
    }

    fn handle_init_command(&self, root: &Path) -> Result<()> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.exists() {
            return Err(SokuError::config(format!(
                "{} already exists",
                path.display()
            )));
        }

        std::fs::write(&path, ConfigLoader::generate_example())?;
        Logger::info(&format!("📝 Wrote {}", path.display()));
        Ok(())
    }
}

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}
