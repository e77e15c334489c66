//! Infrastructure layer for paramlab
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod http;
pub mod memory;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, FileApiConfig, FileConfig, FileDefaultsConfig,
    FileNotificationsConfig, FileOutputConfig, FileSessionConfig,
};
pub use http::HttpResourceClient;
pub use memory::InMemoryResourceClient;
