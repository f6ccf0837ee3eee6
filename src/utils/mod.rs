// Shared utilities module
pub mod errors;
pub mod logging;
pub mod reduce_configs;

pub use errors::*;
pub use logging::*;
pub use reduce_configs::*;
