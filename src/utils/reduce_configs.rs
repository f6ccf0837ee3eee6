// Layered configuration reduction
// Folds an ordered chain of patches and transform functions over a default value

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// A value that can absorb a partial override of itself.
///
/// `apply` must only touch the fields the patch actually sets, so
/// un-overridden defaults survive every layer.
pub trait Layered {
    type Patch;

    fn apply(&mut self, patch: &Self::Patch);
}

/// Transform layer: receives the accumulated value and returns the next one
pub type ConfigFn<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// One entry of a layer sequence
pub enum ConfigLayer<T: Layered> {
    Patch(T::Patch),
    Transform(ConfigFn<T>),
}

/// Caller-supplied override for a config value.
///
/// "No override" is expressed as `Option::None` at the use site.
pub enum ConfigChain<T: Layered> {
    Patch(T::Patch),
    Transform(ConfigFn<T>),
    Layers(Vec<ConfigLayer<T>>),
}

impl<T: Layered> ConfigLayer<T> {
    pub fn transform(f: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        Self::Transform(Arc::new(f))
    }

    fn reduce(&self, mut acc: T) -> T {
        match self {
            ConfigLayer::Patch(patch) => {
                acc.apply(patch);
                acc
            }
            ConfigLayer::Transform(f) => f(acc),
        }
    }
}

impl<T: Layered> ConfigChain<T> {
    pub fn patch(patch: T::Patch) -> Self {
        Self::Patch(patch)
    }

    pub fn transform(f: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        Self::Transform(Arc::new(f))
    }

    pub fn layers(layers: Vec<ConfigLayer<T>>) -> Self {
        Self::Layers(layers)
    }

    /// Apply every layer in order, starting from `initial`
    pub fn reduce(&self, mut initial: T) -> T {
        match self {
            ConfigChain::Patch(patch) => {
                initial.apply(patch);
                initial
            }
            ConfigChain::Transform(f) => f(initial),
            ConfigChain::Layers(layers) => layers
                .iter()
                .fold(initial, |acc, layer| layer.reduce(acc)),
        }
    }
}

/// Merge an optional override chain over a default value.
///
/// An absent chain is the identity layer.
pub fn reduce_configs<T: Layered>(initial: T, config: Option<&ConfigChain<T>>) -> T {
    match config {
        Some(chain) => chain.reduce(initial),
        None => initial,
    }
}

impl<T: Layered> Clone for ConfigLayer<T>
where
    T::Patch: Clone,
{
    fn clone(&self) -> Self {
        match self {
            ConfigLayer::Patch(patch) => ConfigLayer::Patch(patch.clone()),
            ConfigLayer::Transform(f) => ConfigLayer::Transform(Arc::clone(f)),
        }
    }
}

impl<T: Layered> Clone for ConfigChain<T>
where
    T::Patch: Clone,
{
    fn clone(&self) -> Self {
        match self {
            ConfigChain::Patch(patch) => ConfigChain::Patch(patch.clone()),
            ConfigChain::Transform(f) => ConfigChain::Transform(Arc::clone(f)),
            ConfigChain::Layers(layers) => ConfigChain::Layers(layers.clone()),
        }
    }
}

impl<T: Layered> fmt::Debug for ConfigLayer<T>
where
    T::Patch: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLayer::Patch(patch) => f.debug_tuple("Patch").field(patch).finish(),
            ConfigLayer::Transform(_) => f.write_str("Transform(<fn>)"),
        }
    }
}

impl<T: Layered> fmt::Debug for ConfigChain<T>
where
    T::Patch: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigChain::Patch(patch) => f.debug_tuple("Patch").field(patch).finish(),
            ConfigChain::Transform(_) => f.write_str("Transform(<fn>)"),
            ConfigChain::Layers(layers) => f.debug_tuple("Layers").field(layers).finish(),
        }
    }
}

// Config files can only carry patches: a single object or an array of objects.
impl<'de, T> Deserialize<'de> for ConfigChain<T>
where
    T: Layered,
    T::Patch: DeserializeOwned,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw<P> {
            Many(Vec<P>),
            One(P),
        }

        Ok(match Raw::<T::Patch>::deserialize(deserializer)? {
            Raw::Many(patches) => {
                ConfigChain::Layers(patches.into_iter().map(ConfigLayer::Patch).collect())
            }
            Raw::One(patch) => ConfigChain::Patch(patch),
        })
    }
}
