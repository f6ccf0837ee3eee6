// Processors module
pub mod css_minimizer;
pub mod cssnano_minify;
pub mod lightningcss_minify;
pub mod options;

pub use css_minimizer::*;
pub use cssnano_minify::{cssnano_minify, CSSNANO_MINIFY, NODE_BINARY_ENV};
pub use lightningcss_minify::{lightning_css_minify, LIGHTNING_CSS_MINIFY};
pub use options::*;
