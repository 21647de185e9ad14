use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::{
    artifact::find_entry_artifact,
    commands::{CommandRunner, run},
    fs::FileSystem,
    package::{AcquireError, AcquireOptions, ManifestSource},
    project,
};

use super::{PackageResolver, PreparedPackage};

/// Installs a package by building a local project folder
///
/// The project is restored in place and built straight into the package
/// folder.
#[derive(Debug)]
pub struct FolderResolver<'a, CR, FS> {
    runner: &'a CR,
    fs: &'a FS,
    folder: PathBuf,
}

impl<'a, CR, FS> FolderResolver<'a, CR, FS>
where
    CR: CommandRunner,
    FS: FileSystem,
{
    pub fn new(runner: &'a CR, fs: &'a FS, folder: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            fs,
            folder: folder.into(),
        }
    }
}

#[async_trait]
impl<'a, CR, FS> PackageResolver for FolderResolver<'a, CR, FS>
where
    CR: CommandRunner,
    FS: FileSystem,
{
    type Prepared = BuiltPackage<'a, CR>;

    #[instrument(skip(self), fields(folder = %self.folder.display()))]
    async fn prepare(&self, options: &AcquireOptions) -> Result<BuiltPackage<'a, CR>, AcquireError> {
        if let Some(version) = &options.version {
            debug!(%version, "version is ignored for folder sources");
        }

        let descriptor = project::find_descriptor(self.fs, &self.folder)?;
        let name = project::read_package_name(self.fs, &descriptor)?;

        let args = [descriptor.to_string_lossy().into_owned()];
        if !run(self.runner, "restore", &args).await {
            return Err(AcquireError::RestoreFailed {
                target: descriptor.display().to_string(),
            });
        }

        Ok(BuiltPackage {
            runner: self.runner,
            name,
            source_folder: self.folder.clone(),
            descriptor,
        })
    }
}

/// A restored project waiting to be built into its package folder
#[derive(Debug)]
pub struct BuiltPackage<'a, CR> {
    runner: &'a CR,
    name: String,
    source_folder: PathBuf,
    descriptor: PathBuf,
}

impl<CR> BuiltPackage<'_, CR> {
    #[must_use]
    pub fn descriptor(&self) -> &Path {
        &self.descriptor
    }
}

#[async_trait]
impl<CR: CommandRunner> PreparedPackage for BuiltPackage<'_, CR> {
    fn package_name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Option<&str> {
        None
    }

    fn source(&self) -> ManifestSource {
        ManifestSource::Folder {
            path: self.source_folder.clone(),
        }
    }

    async fn populate(&self, folder: &Path) -> Result<String, AcquireError> {
        let args = [
            self.descriptor.to_string_lossy().into_owned(),
            "--configuration".to_string(),
            "Release".to_string(),
            "--output".to_string(),
            folder.to_string_lossy().into_owned(),
        ];
        if !run(self.runner, "build", &args).await {
            return Err(AcquireError::BuildFailed {
                descriptor: self.descriptor.clone(),
            });
        }

        find_entry_artifact(folder)
    }
}
