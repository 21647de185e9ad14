use toolpack::config::{AppConfig, loader::ApplyToConfig};

use crate::cli::ClapCli;

impl ApplyToConfig for ClapCli {
    fn apply_to_config(&self, mut config: AppConfig) -> AppConfig {
        if let Some(dir) = self.packages_directory.as_ref() {
            *config.packages_directory_mut() = dir.clone();
        }

        if let Some(framework) = self.framework.as_ref() {
            *config.target_framework_mut() = framework.clone();
        }

        // Apply UI settings
        *config.verbose_mut() = self.verbose || config.verbose();
        *config.use_colors_mut() = !self.no_color && config.use_colors();

        config
    }
}
