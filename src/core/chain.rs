// Bundler configuration chain
// Keyed registry of build steps that plugins mutate before the build runs

use crate::core::interfaces::Minimizer;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Well-known minimizer slot names
#[derive(Debug, Clone, Copy)]
pub struct MinimizerIds {
    pub js: &'static str,
    pub css: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ChainIdentifier {
    pub minimizer: MinimizerIds,
}

/// Stable identifiers plugins use to address chain slots
pub const CHAIN_ID: ChainIdentifier = ChainIdentifier {
    minimizer: MinimizerIds {
        js: "js",
        css: "css",
    },
};

/// The in-memory build configuration of one environment
#[derive(Default)]
pub struct BundlerChain {
    pub optimization: Optimization,
}

impl BundlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn describe(&self) -> Value {
        json!({ "optimization": self.optimization.describe() })
    }
}

#[derive(Default)]
pub struct Optimization {
    minimizers: IndexMap<String, Arc<dyn Minimizer>>,
}

impl Optimization {
    /// Address a minimizer slot, e.g. `optimization.minimizer(CHAIN_ID.minimizer.css)`
    pub fn minimizer(&mut self, id: &str) -> MinimizerSlot<'_> {
        MinimizerSlot {
            optimization: self,
            id: id.to_string(),
        }
    }

    /// Put `plugin` in slot `id`.
    ///
    /// An occupied slot is replaced in place and keeps its run position.
    pub fn register_minimizer(&mut self, id: impl Into<String>, plugin: Arc<dyn Minimizer>) {
        self.minimizers.insert(id.into(), plugin);
    }

    pub fn get_minimizer(&self, id: &str) -> Option<&Arc<dyn Minimizer>> {
        self.minimizers.get(id)
    }

    pub fn has_minimizer(&self, id: &str) -> bool {
        self.minimizers.contains_key(id)
    }

    pub fn minimizer_ids(&self) -> Vec<String> {
        self.minimizers.keys().cloned().collect()
    }

    /// Minimizers in run order
    pub fn minimizers(&self) -> impl Iterator<Item = (&str, &Arc<dyn Minimizer>)> {
        self.minimizers.iter().map(|(id, plugin)| (id.as_str(), plugin))
    }

    pub fn describe(&self) -> Value {
        let minimizers: Map<String, Value> = self
            .minimizers
            .iter()
            .map(|(id, plugin)| (id.clone(), plugin.describe()))
            .collect();
        json!({ "minimizer": minimizers })
    }
}

/// Fluent handle returned by [`Optimization::minimizer`]
pub struct MinimizerSlot<'a> {
    optimization: &'a mut Optimization,
    id: String,
}

impl<'a> MinimizerSlot<'a> {
    /// Install `plugin` in this slot and return to the optimization level
    pub fn use_plugin(self, plugin: Arc<dyn Minimizer>) -> &'a mut Optimization {
        self.optimization.register_minimizer(self.id, plugin);
        self.optimization
    }
}
