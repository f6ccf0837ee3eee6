// CSS Minimizer Plugin: installs a CSS minimizer into the optimization chain
// with a choice between cssnano and Lightning CSS

use crate::core::chain::{BundlerChain, CHAIN_ID};
use crate::core::interfaces::Minimizer;
use crate::core::models::MinifyConfig;
use crate::core::plugin::{ChainContext, Plugin};
use crate::infrastructure::processors::{
    BrowserTargets, CssMinimizerPlugin, CssnanoOptions, CssnanoPreset, LightningCssOptions,
    MinimizerConfig, CSSNANO_MINIFY, LIGHTNING_CSS_MINIFY,
};
use crate::utils::{reduce_configs, ConfigChain, Logger, Result, SokuError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Name of the CSS minimizer plugin
pub const PLUGIN_CSS_MINIMIZER_NAME: &str = "rsbuild:css-minimizer";

/// Which backend minifies CSS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MinifierSelection {
    /// cssnano through PostCSS, with the most extensive optimizations
    #[default]
    Cssnano,
    /// Lightning CSS, in process and faster
    #[value(name = "lightningcss")]
    LightningCss,
}

impl MinifierSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MinifierSelection::Cssnano => "cssnano",
            MinifierSelection::LightningCss => "lightningcss",
        }
    }
}

impl fmt::Display for MinifierSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MinifierSelection {
    type Err = SokuError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cssnano" => Ok(MinifierSelection::Cssnano),
            "lightningcss" => Ok(MinifierSelection::LightningCss),
            other => Err(SokuError::config(format!(
                "unknown CSS minifier '{}', expected 'cssnano' or 'lightningcss'",
                other
            ))),
        }
    }
}

pub type CssnanoMinimizerConfig = MinimizerConfig<CssnanoOptions>;
pub type LightningCssMinimizerConfig = MinimizerConfig<LightningCssOptions>;

/// Options for the CSS minimizer plugin
///
/// # Example
/// ```
/// use soku_css_minimizer::plugins::{MinifierSelection, PluginCssMinimizerOptions};
///
/// let options: PluginCssMinimizerOptions = serde_json::from_str(r#"{
///     "minifier": "lightningcss",
///     "lightningCssOptions": {
///         "minimizerOptions": { "targets": ["> 0.25%", "not dead"], "drafts": { "nesting": true } }
///     }
/// }"#).unwrap();
///
/// assert_eq!(options.minifier, MinifierSelection::LightningCss);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PluginCssMinimizerOptions {
    #[serde(default)]
    pub minifier: MinifierSelection,
    /// Only consulted when `minifier` is cssnano
    #[serde(default)]
    pub cssnano_options: Option<ConfigChain<CssnanoMinimizerConfig>>,
    /// Only consulted when `minifier` is lightningcss
    #[serde(default)]
    pub lightning_css_options: Option<ConfigChain<LightningCssMinimizerConfig>>,
}

impl PluginCssMinimizerOptions {
    pub fn new(minifier: MinifierSelection) -> Self {
        Self {
            minifier,
            ..Default::default()
        }
    }

    pub fn with_cssnano_options(mut self, options: ConfigChain<CssnanoMinimizerConfig>) -> Self {
        self.cssnano_options = Some(options);
        self
    }

    pub fn with_lightning_css_options(
        mut self,
        options: ConfigChain<LightningCssMinimizerConfig>,
    ) -> Self {
        self.lightning_css_options = Some(options);
        self
    }
}

/// cssnano defaults.
///
/// `mergeLonghand` is off: merging longhands into shorthands breaks
/// `safe-area-inset-*` values (cssnano/cssnano#803).
pub fn cssnano_default_options() -> CssnanoOptions {
    let mut preset_options = Map::new();
    preset_options.insert("mergeLonghand".to_string(), Value::Bool(false));

    CssnanoOptions {
        preset: Some(CssnanoPreset::WithOptions("default".to_string(), preset_options)),
        ..Default::default()
    }
}

/// Lightning CSS defaults: the browserslist `defaults` query
pub fn lightning_css_default_options() -> LightningCssOptions {
    LightningCssOptions {
        targets: Some(BrowserTargets::Query("defaults".to_string())),
        ..Default::default()
    }
}

pub fn resolve_cssnano_config(
    overrides: Option<&ConfigChain<CssnanoMinimizerConfig>>,
) -> CssnanoMinimizerConfig {
    reduce_configs(
        MinimizerConfig::new(CSSNANO_MINIFY, cssnano_default_options()),
        overrides,
    )
}

pub fn resolve_lightning_css_config(
    overrides: Option<&ConfigChain<LightningCssMinimizerConfig>>,
) -> LightningCssMinimizerConfig {
    reduce_configs(
        MinimizerConfig::new(LIGHTNING_CSS_MINIFY, lightning_css_default_options()),
        overrides,
    )
}

/// The config handed to the CSS minimizer plugin for the selected backend
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "minifier", rename_all = "lowercase")]
pub enum ResolvedMinimizerConfig {
    Cssnano(CssnanoMinimizerConfig),
    LightningCss(LightningCssMinimizerConfig),
}

impl ResolvedMinimizerConfig {
    pub fn minify_name(&self) -> &'static str {
        match self {
            ResolvedMinimizerConfig::Cssnano(config) => config.minify.name(),
            ResolvedMinimizerConfig::LightningCss(config) => config.minify.name(),
        }
    }

    fn into_minimizer(self) -> Result<Arc<dyn Minimizer>> {
        let minimizer: Arc<dyn Minimizer> = match self {
            ResolvedMinimizerConfig::Cssnano(config) => Arc::new(CssMinimizerPlugin::new(config)?),
            ResolvedMinimizerConfig::LightningCss(config) => {
                Arc::new(CssMinimizerPlugin::new(config)?)
            }
        };
        Ok(minimizer)
    }
}

/// Merge defaults and overrides for the selected backend only
pub fn resolve_minimizer_config(options: &PluginCssMinimizerOptions) -> ResolvedMinimizerConfig {
    match options.minifier {
        MinifierSelection::Cssnano => {
            ResolvedMinimizerConfig::Cssnano(resolve_cssnano_config(options.cssnano_options.as_ref()))
        }
        MinifierSelection::LightningCss => ResolvedMinimizerConfig::LightningCss(
            resolve_lightning_css_config(options.lightning_css_options.as_ref()),
        ),
    }
}

/// Install the CSS minimizer at `CHAIN_ID.minimizer.css`
pub fn apply_css_minimizer(
    chain: &mut BundlerChain,
    options: &PluginCssMinimizerOptions,
) -> Result<ResolvedMinimizerConfig> {
    let resolved = resolve_minimizer_config(options);
    let minimizer = resolved.clone().into_minimizer()?;

    chain
        .optimization
        .minimizer(CHAIN_ID.minimizer.css)
        .use_plugin(minimizer);

    Ok(resolved)
}

/// Installation gate: production builds with CSS minification switched on
pub fn should_minify_css(is_prod: bool, minify: &MinifyConfig) -> bool {
    is_prod && minify.css_enabled()
}

/// Plugin enabling CSS minification with a choice of minifier
///
/// # Example
/// ```
/// use soku_css_minimizer::plugins::{MinifierSelection, PluginCssMinimizer, PluginCssMinimizerOptions};
/// use soku_css_minimizer::core::plugin::Plugin;
///
/// let plugin = PluginCssMinimizer::new(PluginCssMinimizerOptions::new(MinifierSelection::LightningCss));
/// assert_eq!(plugin.name(), "rsbuild:css-minimizer");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PluginCssMinimizer {
    options: PluginCssMinimizerOptions,
}

impl PluginCssMinimizer {
    pub fn new(options: PluginCssMinimizerOptions) -> Self {
        Self { options }
    }
}

/// Factory returning the plugin ready for registration
pub fn plugin_css_minimizer(options: Option<PluginCssMinimizerOptions>) -> Arc<dyn Plugin> {
    Arc::new(PluginCssMinimizer::new(options.unwrap_or_default()))
}

#[async_trait::async_trait]
impl Plugin for PluginCssMinimizer {
    fn name(&self) -> &str {
        PLUGIN_CSS_MINIMIZER_NAME
    }

    async fn modify_bundler_chain(
        &self,
        chain: &mut BundlerChain,
        context: &ChainContext,
    ) -> Result<()> {
        let environment = &context.environment;

        if !should_minify_css(context.is_prod, &environment.output.minify) {
            let reason = if context.is_dev {
                "development build"
            } else if !context.is_prod {
                "not a production build"
            } else {
                "CSS minification disabled"
            };
            Logger::minimizer_skipped(&environment.name, reason);
            return Ok(());
        }

        let resolved = apply_css_minimizer(chain, &self.options)?;
        Logger::minimizer_installed(
            &environment.name,
            CHAIN_ID.minimizer.css,
            resolved.minify_name(),
        );
        Ok(())
    }
}
