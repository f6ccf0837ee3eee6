// Soku CSS Minimizer
// Installs a cssnano or Lightning CSS minimizer into the Soku optimization chain

pub mod cli;
pub mod config;
pub mod core;
pub mod infrastructure;
pub mod plugins;
pub mod utils;

pub use crate::plugins::{
    plugin_css_minimizer, MinifierSelection, PluginCssMinimizer, PluginCssMinimizerOptions,
    PLUGIN_CSS_MINIMIZER_NAME,
};
