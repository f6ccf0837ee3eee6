// Plugin system for the Soku bundler
// Plugins shape each environment's bundler chain before the build runs

use crate::core::chain::BundlerChain;
use crate::core::models::{BuildMode, EnvironmentContext};
use crate::utils::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Context handed to chain hooks, one per environment being built
#[derive(Debug, Clone)]
pub struct ChainContext {
    pub environment: EnvironmentContext,
    pub is_prod: bool,
    pub is_dev: bool,
}

impl ChainContext {
    pub fn new(environment: EnvironmentContext, mode: BuildMode) -> Self {
        Self {
            environment,
            is_prod: mode.is_prod(),
            is_dev: mode.is_dev(),
        }
    }
}

/// Main plugin trait that all plugins must implement
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique name for this plugin
    fn name(&self) -> &str;

    /// Mutate the bundler chain of one environment
    ///
    /// Called once per environment during config assembly. Each call gets
    /// that environment's own chain.
    async fn modify_bundler_chain(
        &self,
        _chain: &mut BundlerChain,
        _context: &ChainContext,
    ) -> Result<()> {
        Ok(())
    }
}

/// Manages plugin registration and execution
pub struct PluginManager {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginManager {
    /// Create a new empty plugin manager
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Register a plugin
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Get number of registered plugins
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Run every plugin's chain hook in registration order
    pub async fn modify_bundler_chain(
        &self,
        chain: &mut BundlerChain,
        context: &ChainContext,
    ) -> Result<()> {
        for plugin in &self.plugins {
            plugin.modify_bundler_chain(chain, context).await?;
        }
        Ok(())
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interfaces::Minimizer;
    use crate::core::models::{Asset, OutputConfig};
    use crate::utils::SokuError;
    use serde_json::{json, Value};

    struct SlotPlugin {
        slot: &'static str,
    }

    struct Passthrough;

    #[async_trait]
    impl Minimizer for Passthrough {
        fn name(&self) -> &str {
            "passthrough"
        }

        async fn minimize(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
            Ok(assets)
        }

        fn describe(&self) -> Value {
            json!({})
        }
    }

    #[async_trait]
    impl Plugin for SlotPlugin {
        fn name(&self) -> &str {
            self.slot
        }

        async fn modify_bundler_chain(
            &self,
            chain: &mut BundlerChain,
            _context: &ChainContext,
        ) -> Result<()> {
            chain.optimization.register_minimizer(self.slot, Arc::new(Passthrough));
            Ok(())
        }
    }

    struct FailingPlugin;

    #[async_trait]
    impl Plugin for FailingPlugin {
        fn name(&self) -> &str {
            "failing"
        }

        async fn modify_bundler_chain(
            &self,
            _chain: &mut BundlerChain,
            _context: &ChainContext,
        ) -> Result<()> {
            Err(SokuError::plugin("failing", "rejected"))
        }
    }

    fn context() -> ChainContext {
        ChainContext::new(
            EnvironmentContext {
                name: "web".to_string(),
                output: OutputConfig::default(),
            },
            BuildMode::Production,
        )
    }

    #[test]
    fn test_plugin_manager_registration() {
        let mut manager = PluginManager::new();
        assert_eq!(manager.plugin_count(), 0);

        manager.register(Arc::new(SlotPlugin { slot: "a" }));
        manager.register(Arc::new(SlotPlugin { slot: "b" }));
        assert_eq!(manager.plugin_count(), 2);
    }

    #[tokio::test]
    async fn test_hooks_run_in_registration_order() {
        let mut manager = PluginManager::new();
        manager.register(Arc::new(SlotPlugin { slot: "b" }));
        manager.register(Arc::new(SlotPlugin { slot: "a" }));

        let mut chain = BundlerChain::new();
        manager.modify_bundler_chain(&mut chain, &context()).await.unwrap();

        assert_eq!(chain.optimization.minimizer_ids(), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_hook_error_propagates() {
        let mut manager = PluginManager::new();
        manager.register(Arc::new(FailingPlugin));

        let mut chain = BundlerChain::new();
        let result = manager.modify_bundler_chain(&mut chain, &context()).await;
        assert!(matches!(result, Err(SokuError::Plugin { .. })));
    }

    #[test]
    fn test_context_flags_follow_mode() {
        let ctx = context();
        assert!(ctx.is_prod);
        assert!(!ctx.is_dev);
    }
}
