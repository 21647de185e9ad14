use async_trait::async_trait;
use tracing::{info, instrument};

use crate::{
    commands::CommandRunner,
    config::AppConfig,
    fs::FileSystem,
    registry::RegistryClient,
    staging::StagingArea,
};

use super::{
    AcquireError, AcquireOptions, AcquiredPackage, InstallManifest, PackageLocks, PackageSource,
    PackagesFolder,
    resolver::{AcquireStage, FolderResolver, PackageResolver, PreparedPackage, RegistryResolver},
};

/// Primary port for package operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PackageService: Send + Sync {
    /// Install `source` into the packages directory
    ///
    /// `source` is a local project folder if such a directory exists, and a
    /// registry package id otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError`] for any failure. A failure before the
    /// collision check leaves the packages directory untouched; a later one
    /// leaves the package folder without its manifest marker.
    async fn acquire(
        &self,
        source: &str,
        options: &AcquireOptions,
    ) -> Result<AcquiredPackage, AcquireError>;
}

/// Implementation of the PackageService
#[derive(Debug)]
pub struct PackageServiceImpl<RC, CR, FS> {
    registry_client: RC,
    command_runner: CR,
    fs: FS,
    config: AppConfig,
    locks: PackageLocks,
}

impl<RC, CR, FS> PackageServiceImpl<RC, CR, FS>
where
    RC: RegistryClient,
    CR: CommandRunner,
    FS: FileSystem,
{
    pub fn new(registry_client: RC, command_runner: CR, fs: FS, config: AppConfig) -> Self {
        Self {
            registry_client,
            command_runner,
            fs,
            config,
            locks: PackageLocks::default(),
        }
    }

    /// Share a lock table with other services in this process
    #[must_use]
    pub fn with_locks(mut self, locks: PackageLocks) -> Self {
        self.locks = locks;
        self
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    async fn install<R: PackageResolver>(
        &self,
        resolver: &R,
        options: &AcquireOptions,
    ) -> Result<AcquiredPackage, AcquireError> {
        let mut stage = AcquireStage::Start;

        let result = self.run_stages(resolver, options, &mut stage).await;
        if let Err(error) = &result {
            stage.advance(AcquireStage::Failed(error.to_string()));
        }

        result
    }

    async fn run_stages<R: PackageResolver>(
        &self,
        resolver: &R,
        options: &AcquireOptions,
        stage: &mut AcquireStage,
    ) -> Result<AcquiredPackage, AcquireError> {
        stage.advance(AcquireStage::Resolving);
        let prepared = resolver.prepare(options).await?;
        let name = prepared.package_name().to_string();

        let packages = PackagesFolder::new(self.config.packages_directory());
        packages.package_folder(&name)?;
        packages.ensure_root()?;

        // Held until the marker is written
        let _guard = self.locks.lock(&name).await;

        packages.check_collision(&name)?;
        stage.advance(AcquireStage::CollisionChecked);

        let folder = packages.create(&name)?;
        stage.advance(AcquireStage::Installing);

        let entry_point = prepared.populate(&folder).await?;

        let manifest = InstallManifest {
            name: name.clone(),
            version: prepared.version().map(str::to_string),
            entry_point: entry_point.clone(),
            target_framework: self.config.target_framework().to_string(),
            source: prepared.source(),
        };
        packages.write_manifest(&folder, &manifest)?;
        stage.advance(AcquireStage::Done);

        info!(
            package = %name,
            version = manifest.version.as_deref().unwrap_or("-"),
            %entry_point,
            "package installed"
        );

        Ok(AcquiredPackage::new(
            name,
            manifest.version,
            folder,
            entry_point,
        ))
    }
}

#[async_trait]
impl<RC, CR, FS> PackageService for PackageServiceImpl<RC, CR, FS>
where
    RC: RegistryClient,
    CR: CommandRunner,
    FS: FileSystem,
{
    #[instrument(skip(self, options), fields(version = ?options.version))]
    async fn acquire(
        &self,
        source: &str,
        options: &AcquireOptions,
    ) -> Result<AcquiredPackage, AcquireError> {
        match PackageSource::detect(&self.fs, source) {
            PackageSource::Registry { name } => {
                let resolver = RegistryResolver::new(
                    &self.registry_client,
                    &self.command_runner,
                    &name,
                    self.config.registry_source_url(),
                    self.config.target_framework(),
                    StagingArea::new(self.config.staging_root()),
                );
                self.install(&resolver, options).await
            }
            PackageSource::Folder { path } => {
                let resolver = FolderResolver::new(&self.command_runner, &self.fs, path);
                self.install(&resolver, options).await
            }
        }
    }
}
