pub mod loader;

use std::{
    num::NonZeroU64,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

const PACKAGES_DIRECTORY_DEFAULT: &str = "~/.toolpack/packages";
const TARGET_FRAMEWORK_DEFAULT: &str = "net8.0";
const TOOLCHAIN_DEFAULT: &str = "dotnet";
const COMMAND_TIMEOUT_DEFAULT: NonZeroU64 = NonZeroU64::MIN.saturating_add(299);
const REGISTRY_TIMEOUT_DEFAULT: NonZeroU64 = NonZeroU64::MIN.saturating_add(29);
const VERBOSE_DEFAULT: bool = false;
const USE_COLORS_DEFAULT: bool = true;

/// Application configuration that combines the config file and CLI args
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    // Install settings
    pub(crate) packages_directory: PathBuf,
    pub(crate) registry_source_url: Option<String>,
    pub(crate) target_framework: String,
    pub(crate) staging_directory: Option<PathBuf>,

    // Toolchain settings
    pub(crate) toolchain: String,
    pub(crate) command_timeout: NonZeroU64,
    pub(crate) registry_timeout: NonZeroU64,

    // UI settings
    pub(crate) verbose: bool,
    pub(crate) use_colors: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfigBuilder::default().build()
    }
}

impl AppConfig {
    /// Root directory holding one sub-directory per installed package
    #[must_use]
    pub fn packages_directory(&self) -> &Path {
        &self.packages_directory
    }

    /// Registry used when the caller does not pass one explicitly
    #[must_use]
    pub fn registry_source_url(&self) -> Option<&str> {
        self.registry_source_url.as_deref()
    }

    /// Target framework moniker every installed package must support
    #[must_use]
    pub fn target_framework(&self) -> &str {
        &self.target_framework
    }

    /// Root under which per-call staging directories are created
    #[must_use]
    pub fn staging_root(&self) -> PathBuf {
        self.staging_directory
            .clone()
            .unwrap_or_else(crate::staging::temp_dir_base)
    }

    #[must_use]
    pub fn toolchain(&self) -> &str {
        &self.toolchain
    }

    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout.into())
    }

    #[must_use]
    pub fn registry_timeout(&self) -> Duration {
        Duration::from_secs(self.registry_timeout.into())
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    #[must_use]
    pub fn use_colors(&self) -> bool {
        self.use_colors
    }

    pub fn packages_directory_mut(&mut self) -> &mut PathBuf {
        &mut self.packages_directory
    }

    pub fn registry_source_url_mut(&mut self) -> &mut Option<String> {
        &mut self.registry_source_url
    }

    pub fn target_framework_mut(&mut self) -> &mut String {
        &mut self.target_framework
    }

    pub fn verbose_mut(&mut self) -> &mut bool {
        &mut self.verbose
    }

    pub fn use_colors_mut(&mut self) -> &mut bool {
        &mut self.use_colors
    }
}

/// Builder pattern for `AppConfig`
///
#[derive(Default, Debug)]
pub struct AppConfigBuilder {
    packages_directory: Option<PathBuf>,
    registry_source_url: Option<String>,
    target_framework: Option<String>,
    staging_directory: Option<PathBuf>,
    toolchain: Option<String>,
    command_timeout: Option<NonZeroU64>,
    registry_timeout: Option<NonZeroU64>,
    verbose: Option<bool>,
    use_colors: Option<bool>,
}

impl AppConfigBuilder {
    #[must_use]
    pub fn packages_directory<D>(mut self, packages_directory: D) -> Self
    where
        D: AsRef<std::ffi::OsStr>,
    {
        self.packages_directory = Some(PathBuf::from(packages_directory.as_ref()));
        self
    }

    #[must_use]
    pub fn registry_source_url(mut self, url: &str) -> Self {
        self.registry_source_url = Some(url.to_string());
        self
    }

    #[must_use]
    pub fn target_framework(mut self, moniker: &str) -> Self {
        self.target_framework = Some(moniker.to_string());
        self
    }

    #[must_use]
    pub fn staging_directory<D>(mut self, staging_directory: D) -> Self
    where
        D: AsRef<std::ffi::OsStr>,
    {
        self.staging_directory = Some(PathBuf::from(staging_directory.as_ref()));
        self
    }

    #[must_use]
    pub fn toolchain(mut self, program: &str) -> Self {
        self.toolchain = Some(program.to_string());
        self
    }

    /// Set the command timeout in seconds; zero keeps the default
    #[must_use]
    pub fn command_timeout(mut self, seconds: u64) -> Self {
        self.command_timeout = NonZeroU64::new(seconds);
        self
    }

    /// Set the registry timeout in seconds; zero keeps the default
    #[must_use]
    pub fn registry_timeout(mut self, seconds: u64) -> Self {
        self.registry_timeout = NonZeroU64::new(seconds);
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    #[must_use]
    pub fn use_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = Some(use_colors);
        self
    }

    #[must_use]
    pub fn build(self) -> AppConfig {
        AppConfig {
            packages_directory: self
                .packages_directory
                .unwrap_or_else(|| PathBuf::from(PACKAGES_DIRECTORY_DEFAULT)),
            registry_source_url: self.registry_source_url,
            target_framework: self
                .target_framework
                .unwrap_or_else(|| TARGET_FRAMEWORK_DEFAULT.to_string()),
            staging_directory: self.staging_directory,
            toolchain: self
                .toolchain
                .unwrap_or_else(|| TOOLCHAIN_DEFAULT.to_string()),
            command_timeout: self.command_timeout.unwrap_or(COMMAND_TIMEOUT_DEFAULT),
            registry_timeout: self.registry_timeout.unwrap_or(REGISTRY_TIMEOUT_DEFAULT),
            verbose: self.verbose.unwrap_or(VERBOSE_DEFAULT),
            use_colors: self.use_colors.unwrap_or(USE_COLORS_DEFAULT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_builder() {
        let config = AppConfigBuilder::default()
            .packages_directory("/test/packages")
            .registry_source_url("https://registry.example.com/v3/registration")
            .target_framework("net6.0")
            .staging_directory("/test/staging")
            .toolchain("/usr/local/bin/dotnet")
            .command_timeout(120)
            .registry_timeout(10)
            .verbose(true)
            .use_colors(false)
            .build();

        assert_eq!(config.packages_directory(), Path::new("/test/packages"));
        assert_eq!(
            config.registry_source_url(),
            Some("https://registry.example.com/v3/registration")
        );
        assert_eq!(config.target_framework(), "net6.0");
        assert_eq!(config.staging_root(), PathBuf::from("/test/staging"));
        assert_eq!(config.toolchain(), "/usr/local/bin/dotnet");
        assert_eq!(config.command_timeout(), Duration::from_secs(120));
        assert_eq!(config.registry_timeout(), Duration::from_secs(10));
        assert!(config.verbose());
        assert!(!config.use_colors());
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();

        assert_eq!(
            config.packages_directory(),
            Path::new(PACKAGES_DIRECTORY_DEFAULT)
        );
        assert_eq!(config.registry_source_url(), None);
        assert_eq!(config.target_framework(), TARGET_FRAMEWORK_DEFAULT);
        assert_eq!(config.toolchain(), TOOLCHAIN_DEFAULT);
        assert_eq!(config.command_timeout().as_secs(), 300);
        assert_eq!(config.registry_timeout().as_secs(), 30);
        assert_eq!(config.verbose(), VERBOSE_DEFAULT);
        assert_eq!(config.use_colors(), USE_COLORS_DEFAULT);
        assert!(config.staging_root().is_absolute());
    }

    #[test]
    fn test_zero_timeout_keeps_default() {
        let config = AppConfigBuilder::default().command_timeout(0).build();

        assert_eq!(config.command_timeout().as_secs(), 300);
    }

    #[test]
    fn test_mutable_accessors() {
        let mut config = AppConfigBuilder::default()
            .packages_directory("/old/path")
            .build();

        *config.packages_directory_mut() = PathBuf::from("/new/path");
        *config.registry_source_url_mut() = Some("https://other.example.com".to_string());
        *config.target_framework_mut() = "net9.0".to_string();
        *config.verbose_mut() = true;
        *config.use_colors_mut() = false;

        assert_eq!(config.packages_directory(), Path::new("/new/path"));
        assert_eq!(
            config.registry_source_url(),
            Some("https://other.example.com")
        );
        assert_eq!(config.target_framework(), "net9.0");
        assert!(config.verbose());
        assert!(!config.use_colors());
    }

    #[test]
    fn test_serde_deserialization() {
        let yaml = r#"
            packages_directory: "/opt/packages"
            registry_source_url: "https://registry.example.com/v3/registration"
            target_framework: "net7.0"
            toolchain: "dotnet"
            command_timeout: 90
            registry_timeout: 15
            verbose: true
            use_colors: false
        "#;

        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.packages_directory, PathBuf::from("/opt/packages"));
        assert_eq!(
            config.registry_source_url.as_deref(),
            Some("https://registry.example.com/v3/registration")
        );
        assert_eq!(config.target_framework, "net7.0");
        assert_eq!(config.command_timeout.get(), 90);
        assert_eq!(config.registry_timeout.get(), 15);
        assert!(config.verbose);
        assert!(!config.use_colors);
    }

    #[test]
    fn test_serde_partial_deserialization() {
        let yaml = r#"
            packages_directory: "/dev/packages"
        "#;

        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.packages_directory, PathBuf::from("/dev/packages"));
        assert_eq!(config.registry_source_url, None);
        assert_eq!(config.target_framework, TARGET_FRAMEWORK_DEFAULT);
        assert_eq!(config.command_timeout.get(), 300);
        assert!(config.use_colors);
    }
}
