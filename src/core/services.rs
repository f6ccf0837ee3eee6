use crate::core::chain::BundlerChain;
use crate::core::interfaces::{BuildService, FileSystemService};
use crate::core::models::*;
use crate::core::plugin::{ChainContext, Plugin, PluginManager};
use crate::utils::{ErrorContext, Logger, Result, SokuError, Timer};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Chain assembled for one environment
pub struct EnvironmentChain {
    pub environment: EnvironmentContext,
    pub chain: BundlerChain,
}

/// Runs stylesheets through each environment's minimizer chain
pub struct CssBuildService {
    fs_service: Arc<dyn FileSystemService>,
    plugin_manager: PluginManager,
}

impl CssBuildService {
    pub fn new(fs_service: Arc<dyn FileSystemService>) -> Self {
        Self {
            fs_service,
            plugin_manager: PluginManager::new(),
        }
    }

    /// Register a plugin with the build service
    pub fn with_plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugin_manager.register(plugin);
        self
    }

    /// Build a fresh chain per environment and let every plugin shape it
    pub async fn assemble_chains(&self, config: &BuildConfig) -> Result<Vec<EnvironmentChain>> {
        let mut chains = Vec::new();

        for environment in config.resolve_environments() {
            let context = ChainContext::new(environment.clone(), config.mode);
            let mut chain = BundlerChain::new();

            self.plugin_manager
                .modify_bundler_chain(&mut chain, &context)
                .await?;

            chains.push(EnvironmentChain { environment, chain });
        }

        Ok(chains)
    }

    async fn load_sources(&self, config: &BuildConfig, dist_dirs: &[PathBuf]) -> Result<Vec<Asset>> {
        let _timer = Timer::start("Loading stylesheets");

        let files = self.fs_service.scan_css_files(&config.root, dist_dirs).await?;
        let mut assets = Vec::with_capacity(files.len());

        for path in files {
            let source = self.fs_service.read_file(&path).await?;
            assets.push(Asset::new(asset_name(&config.root, &path), source));
        }

        Ok(assets)
    }

    async fn build_environment(
        &self,
        config: &BuildConfig,
        environment_chain: EnvironmentChain,
        sources: &[Asset],
    ) -> Result<EnvironmentResult> {
        let EnvironmentChain { environment, chain } = environment_chain;
        let _timer = Timer::start(&format!("Environment {}", environment.name));

        let mut assets = sources.to_vec();
        for (id, minimizer) in chain.optimization.minimizers() {
            Logger::debug(&format!(
                "[{}] running minimizer '{}' ({})",
                environment.name,
                id,
                minimizer.name()
            ));
            assets = minimizer.minimize(assets).await.map_err(|e| {
                let mut context = ErrorContext::new().with_environment(environment.name.as_str());
                if let SokuError::Minify { asset, .. } = &e {
                    context = context.with_file(config.root.join(asset));
                }
                SokuError::build_with_context(e.to_string(), context)
            })?;
        }

        let outdir = config.root.join(&environment.output.dist_path);
        let mut output_files = Vec::with_capacity(assets.len());

        for asset in assets {
            let path = outdir.join(&asset.name);
            self.fs_service.write_file(&path, &asset.source).await?;
            output_files.push(OutputFile {
                size: asset.source.len(),
                path,
                content: asset.source,
            });
        }

        Ok(EnvironmentResult {
            name: environment.name,
            minimizers: chain.optimization.minimizer_ids(),
            output_files,
        })
    }
}

/// Root-relative name with `/` separators
fn asset_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl BuildService for CssBuildService {
    async fn build(&self, config: &BuildConfig) -> Result<BuildResult> {
        let start = Instant::now();
        let chains = self.assemble_chains(config).await?;

        Logger::build_start(
            &config.root.display().to_string(),
            config.mode.as_str(),
            chains.len(),
        );

        let dist_dirs: Vec<PathBuf> = chains
            .iter()
            .map(|c| config.root.join(&c.environment.output.dist_path))
            .collect();
        let sources = self.load_sources(config, &dist_dirs).await?;

        let mut environments = Vec::with_capacity(chains.len());
        for environment_chain in chains {
            environments.push(self.build_environment(config, environment_chain, &sources).await?);
        }

        let result = BuildResult {
            environments,
            build_time: start.elapsed(),
            success: true,
        };

        let outdir = config.root.join(&config.output.dist_path);
        Logger::build_complete(
            result.output_files().count(),
            result.build_time,
            &outdir.display().to_string(),
        );

        Ok(result)
    }
}
