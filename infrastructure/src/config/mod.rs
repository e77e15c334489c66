//! Configuration file loading for paramlab
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. `PARAMLAB_*` environment variables
//! 3. Project root: `./paramlab.toml` or `./.paramlab.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/paramlab/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, FileApiConfig, FileConfig, FileDefaultsConfig,
    FileNotificationsConfig, FileOutputConfig, FileSessionConfig,
};
pub use loader::{ConfigError, ConfigLoader, ENV_PREFIX};
