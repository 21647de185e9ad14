//! `AppConfig` test helpers

use std::path::Path;

use toolpack::config::{AppConfig, AppConfigBuilder};

use crate::constants::{TEST_FRAMEWORK, TEST_SOURCE_URL};

/// Configuration rooted in test directories, with colors disabled
#[must_use]
pub fn test_config(packages_directory: &Path, staging_directory: &Path) -> AppConfig {
    AppConfigBuilder::default()
        .packages_directory(packages_directory)
        .staging_directory(staging_directory)
        .registry_source_url(TEST_SOURCE_URL)
        .target_framework(TEST_FRAMEWORK)
        .command_timeout(30)
        .use_colors(false)
        .build()
}
