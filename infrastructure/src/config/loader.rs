//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of environment variables that override file settings
pub const ENV_PREFIX: &str = "PARAMLAB_";

const PROJECT_FILES: [&str; 2] = ["paramlab.toml", ".paramlab.toml"];

/// Configuration could not be loaded
#[derive(Debug, Error)]
#[error("Failed to load configuration: {0}")]
pub struct ConfigError(#[from] Box<figment::Error>);

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. `PARAMLAB_*` environment variables (`__` separates sections)
    /// 3. Project root: `./paramlab.toml` or `./.paramlab.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/paramlab/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, ConfigError> {
        Self::figment(config_path, Self::project_config_path(), Self::global_config_path())
            .extract()
            .map_err(ConfigError::from)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn figment(
        config_path: Option<&PathBuf>,
        project_path: Option<PathBuf>,
        global_path: Option<PathBuf>,
    ) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = global_path.filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(global_path));
        }

        if let Some(project_path) = project_path {
            figment = figment.merge(Toml::file(project_path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/paramlab/config.toml if set,
    /// otherwise the platform config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("paramlab").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::project_config_in(Path::new("."))
    }

    fn project_config_in(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");

        match config_path {
            Some(path) if path.exists() => println!("  [FOUND] Explicit: {}", path.display()),
            Some(path) => println!("  [MISS ] Explicit: {}", path.display()),
            None => println!("  [     ] Explicit: --config <path>"),
        }

        let env_vars: Vec<String> = std::env::vars()
            .map(|(key, _)| key)
            .filter(|key| key.starts_with(ENV_PREFIX))
            .collect();
        if env_vars.is_empty() {
            println!("  [     ] Env:      {}*", ENV_PREFIX);
        } else {
            println!("  [FOUND] Env:      {}", env_vars.join(", "));
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project:  {}", path.display());
        } else {
            println!("  [     ] Project:  ./paramlab.toml or ./.paramlab.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:   {}", path.display());
            } else {
                println!("  [     ] Global:   {}", path.display());
            }
        }

        println!("  [     ] Default:  built-in defaults");
    }
}
