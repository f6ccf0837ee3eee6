// Core domain layer
pub mod chain;
pub mod interfaces;
pub mod models;
pub mod plugin;
pub mod services;

pub use chain::*;
pub use interfaces::*;
pub use models::*;
pub use plugin::*;
pub use services::*;
