//! Configuration container.

pub mod config;

pub use config::{ConfigError, ProviderConfig};
