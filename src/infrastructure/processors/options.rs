// Option types shared by the CSS minimizer plugin and its two backends

use crate::utils::{Layered, Logger, Result};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Input handed to a backend minify function
#[derive(Debug, Clone, Copy)]
pub struct MinifyInput<'a> {
    /// Asset name, used as the stylesheet filename in diagnostics
    pub name: &'a str,
    pub source: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MinifyOutput {
    pub code: String,
    pub warnings: Vec<String>,
}

/// Named reference to a backend minify function.
///
/// Two references are equal when they name the same backend function.
pub struct MinifyFn<O> {
    name: &'static str,
    func: fn(&MinifyInput<'_>, &O) -> Result<MinifyOutput>,
}

impl<O> MinifyFn<O> {
    pub const fn new(
        name: &'static str,
        func: fn(&MinifyInput<'_>, &O) -> Result<MinifyOutput>,
    ) -> Self {
        Self { name, func }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self, input: &MinifyInput<'_>, options: &O) -> Result<MinifyOutput> {
        (self.func)(input, options)
    }
}

impl<O> Clone for MinifyFn<O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O> Copy for MinifyFn<O> {}

impl<O> PartialEq for MinifyFn<O> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<O> fmt::Debug for MinifyFn<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MinifyFn({})", self.name)
    }
}

impl<O> Serialize for MinifyFn<O> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

/// One regex or a list of regexes matched against asset names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetPattern {
    One(String),
    Many(Vec<String>),
}

impl AssetPattern {
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            AssetPattern::One(pattern) => vec![pattern.as_str()],
            AssetPattern::Many(patterns) => patterns.iter().map(String::as_str).collect(),
        }
    }
}

/// `true` uses every core, `false` minifies one asset at a time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parallel {
    Enabled(bool),
    Workers(usize),
}

impl Parallel {
    pub fn concurrency(&self) -> usize {
        match self {
            Parallel::Enabled(true) => num_cpus::get().max(1),
            Parallel::Enabled(false) => 1,
            Parallel::Workers(workers) => (*workers).max(1),
        }
    }
}

/// Backend-specific `minimizerOptions`
pub trait BackendOptions:
    Layered<Patch = Self> + Clone + fmt::Debug + Serialize + Send + Sync + 'static
{
    /// Reject options the backend could never run with
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Everything the CSS minimizer plugin is constructed with
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimizerConfig<O> {
    pub minify: MinifyFn<O>,
    pub minimizer_options: O,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<AssetPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<AssetPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<AssetPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<Parallel>,
}

impl<O> MinimizerConfig<O> {
    pub fn new(minify: MinifyFn<O>, minimizer_options: O) -> Self {
        Self {
            minify,
            minimizer_options,
            test: None,
            include: None,
            exclude: None,
            parallel: None,
        }
    }
}

/// Partial [`MinimizerConfig`], as written by callers and config files
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(
    rename_all = "camelCase",
    deny_unknown_fields,
    bound(deserialize = "O: Deserialize<'de>")
)]
pub struct MinimizerConfigPatch<O> {
    /// Only settable from code
    #[serde(skip)]
    pub minify: Option<MinifyFn<O>>,
    #[serde(default)]
    pub minimizer_options: Option<O>,
    #[serde(default)]
    pub test: Option<AssetPattern>,
    #[serde(default)]
    pub include: Option<AssetPattern>,
    #[serde(default)]
    pub exclude: Option<AssetPattern>,
    #[serde(default)]
    pub parallel: Option<Parallel>,
}

impl<O> MinimizerConfigPatch<O> {
    pub fn with_minimizer_options(minimizer_options: O) -> Self {
        Self {
            minify: None,
            minimizer_options: Some(minimizer_options),
            test: None,
            include: None,
            exclude: None,
            parallel: None,
        }
    }
}

// Sibling keys are replaced; minimizer_options is merged key by key.
impl<O: BackendOptions> Layered for MinimizerConfig<O> {
    type Patch = MinimizerConfigPatch<O>;

    fn apply(&mut self, patch: &MinimizerConfigPatch<O>) {
        if let Some(minify) = patch.minify {
            self.minify = minify;
        }
        if let Some(options) = &patch.minimizer_options {
            self.minimizer_options.apply(options);
        }
        if let Some(test) = &patch.test {
            self.test = Some(test.clone());
        }
        if let Some(include) = &patch.include {
            self.include = Some(include.clone());
        }
        if let Some(exclude) = &patch.exclude {
            self.exclude = Some(exclude.clone());
        }
        if let Some(parallel) = patch.parallel {
            self.parallel = Some(parallel);
        }
    }
}

fn merge_extra(target: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        target.insert(key.clone(), value.clone());
    }
}

/// cssnano preset: a bare name or `[name, options]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CssnanoPreset {
    Name(String),
    WithOptions(String, Map<String, Value>),
}

impl CssnanoPreset {
    pub fn name(&self) -> &str {
        match self {
            CssnanoPreset::Name(name) | CssnanoPreset::WithOptions(name, _) => name,
        }
    }

    pub fn options(&self) -> Option<&Map<String, Value>> {
        match self {
            CssnanoPreset::Name(_) => None,
            CssnanoPreset::WithOptions(_, options) => Some(options),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssnanoOptions {
    /// Path to a cssnano configuration file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<CssnanoPreset>,
    /// Passed through to cssnano untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Layered for CssnanoOptions {
    type Patch = CssnanoOptions;

    fn apply(&mut self, patch: &CssnanoOptions) {
        if let Some(config_file) = &patch.config_file {
            self.config_file = Some(config_file.clone());
        }
        if let Some(preset) = &patch.preset {
            self.preset = Some(preset.clone());
        }
        merge_extra(&mut self.extra, &patch.extra);
    }
}

impl BackendOptions for CssnanoOptions {
    fn validate(&self) -> Result<()> {
        match &self.preset {
            Some(preset) if preset.name().trim().is_empty() => Err(
                crate::utils::SokuError::config("cssnano preset name must not be empty"),
            ),
            _ => Ok(()),
        }
    }
}

/// Browser targets: a browserslist query, a list of queries, or
/// browser name to Lightning CSS encoded version (`major << 16 | minor << 8`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BrowserTargets {
    Query(String),
    Queries(Vec<String>),
    Versions(BTreeMap<String, u32>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drafts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nesting: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_media: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightningCssOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<BrowserTargets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drafts: Option<Drafts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_recovery: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unused_symbols: Option<Vec<String>>,
    /// Options this crate does not interpret; logged and ignored
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LightningCssOptions {
    /// Keys passed under `minimizerOptions` that are not mapped onto Lightning CSS
    pub fn unsupported_keys(&self) -> Vec<&str> {
        self.extra.keys().map(String::as_str).collect()
    }
}

impl Layered for LightningCssOptions {
    type Patch = LightningCssOptions;

    fn apply(&mut self, patch: &LightningCssOptions) {
        if let Some(targets) = &patch.targets {
            self.targets = Some(targets.clone());
        }
        if let Some(drafts) = &patch.drafts {
            self.drafts = Some(drafts.clone());
        }
        if let Some(error_recovery) = patch.error_recovery {
            self.error_recovery = Some(error_recovery);
        }
        if let Some(unused_symbols) = &patch.unused_symbols {
            self.unused_symbols = Some(unused_symbols.clone());
        }
        merge_extra(&mut self.extra, &patch.extra);
    }
}

impl BackendOptions for LightningCssOptions {
    fn validate(&self) -> Result<()> {
        let unsupported = self.unsupported_keys();
        if !unsupported.is_empty() {
            Logger::warn(&format!(
                "Lightning CSS options have no effect and are ignored: {}",
                unsupported.join(", ")
            ));
        }

        super::lightningcss_minify::resolve_browsers(self.targets.as_ref())
            .map(|_| ())
            .map_err(crate::utils::SokuError::config)
    }
}
