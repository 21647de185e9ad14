use std::path::PathBuf;

use config::FileFormat;
use tracing::debug;

use crate::{config::AppConfig, fs::FileSystem};

use super::{ConfigLoadError, ConfigLoader};

/// Loads `config.yaml` (or `config.yml`) from the user's config directory
pub struct YamlLoader<'a, F: FileSystem> {
    fs: &'a F,
}

impl<'a, F: FileSystem> YamlLoader<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    fn expand_directories(&self, mut app_config: AppConfig) -> AppConfig {
        if let Ok(expanded) = self.fs.expand_path(&app_config.packages_directory) {
            app_config.packages_directory = expanded;
        }

        if let Some(staging) = app_config.staging_directory.take() {
            app_config.staging_directory =
                Some(self.fs.expand_path(&staging).unwrap_or(staging));
        }

        app_config
    }
}

impl<F: FileSystem> ConfigLoader for YamlLoader<'_, F> {
    fn load_config(&self) -> Result<AppConfig, ConfigLoadError> {
        let config_paths = self.find_config_file_paths();

        if config_paths.len() > 1 {
            return Err(ConfigLoadError::MultipleFound(
                config_paths
                    .into_iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>(),
            ));
        }

        let Some(config_path) = config_paths.first() else {
            debug!("No config file found; using defaults");
            return Ok(self.expand_directories(AppConfig::default()));
        };

        debug!(path = %config_path.display(), "Loading config file");
        let file_contents = self.fs.read_file(config_path)?;

        let config = config::Config::builder()
            .add_source(config::File::from_str(&file_contents, FileFormat::Yaml))
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;

        Ok(self.expand_directories(app_config))
    }

    fn find_config_file_paths(&self) -> Vec<PathBuf> {
        let Ok(config_dir) = self.fs.config_dir() else {
            return Vec::new();
        };

        ["config.yaml", "config.yml"]
            .into_iter()
            .map(|name| config_dir.join(name))
            .filter(|path| self.fs.path_exists(path))
            .collect()
    }
}
