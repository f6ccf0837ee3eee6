use super::options::{AssetPattern, BackendOptions, MinifyFn, MinifyInput, MinimizerConfig, Parallel};
use crate::core::interfaces::Minimizer;
use crate::core::models::Asset;
use crate::utils::{Logger, Result, SokuError, Timer};
use futures::{stream, StreamExt, TryStreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::Arc;

pub const CSS_MINIMIZER_PLUGIN_NAME: &str = "CssMinimizerPlugin";

// Matches `style.css` and `style.css?v=1`
static DEFAULT_TEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.css(\?.*)?$").expect("default CSS asset pattern is valid")
});

/// Optimization step that minifies CSS assets with one backend.
///
/// Construction validates the asset filters and the backend options, so a
/// chain never holds a minimizer that is bound to fail on every asset.
pub struct CssMinimizerPlugin<O> {
    config: MinimizerConfig<O>,
    test: Vec<Regex>,
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    concurrency: usize,
}

impl<O: BackendOptions> CssMinimizerPlugin<O> {
    pub fn new(config: MinimizerConfig<O>) -> Result<Self> {
        config.minimizer_options.validate()?;

        let test = match &config.test {
            Some(pattern) => compile(pattern)?,
            None => vec![DEFAULT_TEST.clone()],
        };
        let include = config.include.as_ref().map(compile).transpose()?.unwrap_or_default();
        let exclude = config.exclude.as_ref().map(compile).transpose()?.unwrap_or_default();
        let concurrency = config
            .parallel
            .unwrap_or(Parallel::Enabled(true))
            .concurrency();

        Ok(Self {
            config,
            test,
            include,
            exclude,
            concurrency,
        })
    }

    /// Whether `name` is picked up by test/include/exclude
    pub fn matches(&self, name: &str) -> bool {
        self.test.iter().any(|re| re.is_match(name))
            && (self.include.is_empty() || self.include.iter().any(|re| re.is_match(name)))
            && !self.exclude.iter().any(|re| re.is_match(name))
    }
}

fn compile(pattern: &AssetPattern) -> Result<Vec<Regex>> {
    pattern
        .patterns()
        .into_iter()
        .map(|p| Regex::new(p).map_err(SokuError::from))
        .collect()
}

async fn minify_asset<O: BackendOptions>(
    minify: MinifyFn<O>,
    options: Arc<O>,
    asset: Asset,
) -> Result<Asset> {
    let name = asset.name.clone();
    let before = asset.source.len();

    let output = tokio::task::spawn_blocking(move || {
        let input = MinifyInput {
            name: &asset.name,
            source: &asset.source,
        };
        minify.call(&input, &options)
    })
    .await
    .map_err(|e| SokuError::minify(name.as_str(), format!("minify task failed: {}", e)))??;

    for warning in &output.warnings {
        Logger::warn(&format!("{}: {}", name, warning));
    }
    Logger::minified_asset(&name, before, output.code.len());

    Ok(Asset {
        name,
        source: output.code,
    })
}

#[async_trait::async_trait]
impl<O: BackendOptions> Minimizer for CssMinimizerPlugin<O> {
    fn name(&self) -> &str {
        CSS_MINIMIZER_PLUGIN_NAME
    }

    async fn minimize(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
        let _timer = Timer::start(&format!(
            "{} with {}",
            CSS_MINIMIZER_PLUGIN_NAME,
            self.config.minify.name()
        ));

        let minify = self.config.minify;
        let options = Arc::new(self.config.minimizer_options.clone());

        let jobs: Vec<_> = assets
            .into_iter()
            .map(|asset| {
                let selected = self.matches(&asset.name);
                let options = Arc::clone(&options);
                async move {
                    if selected {
                        minify_asset(minify, options, asset).await
                    } else {
                        Ok(asset)
                    }
                }
            })
            .collect();

        // `buffered` keeps results in input order
        stream::iter(jobs)
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    fn describe(&self) -> Value {
        json!({
            "name": CSS_MINIMIZER_PLUGIN_NAME,
            "options": serde_json::to_value(&self.config).unwrap_or(Value::Null),
        })
    }
}
