//! A throwaway packages/staging/package-cache layout for end-to-end tests.

use std::{fs, path::PathBuf};

use tempfile::TempDir;
use toolpack::{config::AppConfig, fs::RealFileSystem, package::PackageServiceImpl};

use crate::{
    config::test_config,
    fakes::{ScriptedCommandRunner, StaticRegistryClient},
};

pub type TestService = PackageServiceImpl<StaticRegistryClient, ScriptedCommandRunner, RealFileSystem>;

/// Temporary directories standing in for the packages directory, the staging
/// root and the restore's package cache
#[derive(Debug)]
pub struct TestEnv {
    root: TempDir,
}

impl TestEnv {
    /// # Panics
    ///
    /// Panics if the temporary directories cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let root = TempDir::new().expect("create temp dir");
        for dir in ["packages", "staging", "nuget", "sources"] {
            fs::create_dir_all(root.path().join(dir)).expect("create test dir");
        }

        Self { root }
    }

    #[must_use]
    pub fn packages_dir(&self) -> PathBuf {
        self.root.path().join("packages")
    }

    #[must_use]
    pub fn staging_dir(&self) -> PathBuf {
        self.root.path().join("staging")
    }

    /// Package cache the scripted restore reports
    #[must_use]
    pub fn nuget_dir(&self) -> PathBuf {
        self.root.path().join("nuget")
    }

    /// Scratch space for folder-source projects
    #[must_use]
    pub fn sources_dir(&self) -> PathBuf {
        self.root.path().join("sources")
    }

    #[must_use]
    pub fn config(&self) -> AppConfig {
        test_config(&self.packages_dir(), &self.staging_dir())
    }

    /// Number of entries left under the staging root
    ///
    /// # Panics
    ///
    /// Panics if the staging root cannot be read.
    #[must_use]
    pub fn staging_entries(&self) -> usize {
        fs::read_dir(self.staging_dir())
            .expect("read staging dir")
            .count()
    }

    /// A service over this layout using the given fakes
    #[must_use]
    pub fn service(
        &self,
        registry: StaticRegistryClient,
        runner: ScriptedCommandRunner,
    ) -> TestService {
        PackageServiceImpl::new(registry, runner, RealFileSystem, self.config())
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
