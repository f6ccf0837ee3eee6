// Plugins for the Soku bundler

pub mod css_minimizer;

pub use css_minimizer::*;
