pub mod yaml;

pub use self::yaml::YamlLoader;

use std::path::PathBuf;

use thiserror::Error;

use crate::{config::AppConfig, fs::FileSystemError};

/// Port for loading configuration from disk
///
#[cfg_attr(test, mockall::automock)]
pub trait ConfigLoader: Send + Sync {
    /// Load configuration from standard locations
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError`] if a config file exists but cannot be read
    /// or deserialized, or if more than one candidate file exists.
    fn load_config(&self) -> Result<AppConfig, ConfigLoadError>;

    /// Find existing configuration file paths
    ///
    fn find_config_file_paths(&self) -> Vec<PathBuf>;
}

#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error(transparent)]
    FileSystemError(#[from] FileSystemError),

    #[error("Multiple configuration files found: {}", .0.join(", "))]
    MultipleFound(Vec<String>),

    #[error(transparent)]
    ConfigError(#[from] ::config::ConfigError),
}

/// This trait allows for applying runtime CLI arguments on top of the configuration that the app
/// read from the config file.
///
pub trait ApplyToConfig {
    /// Implement this method such that the arguments in `self` are applied after/on top of the
    /// configuration that was loaded from the config file.
    ///
    fn apply_to_config(&self, config: AppConfig) -> AppConfig;
}
