use std::{
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::{
    artifact::find_entry_artifact,
    commands::{CommandRunner, run},
    package::{AcquireError, AcquireOptions, ManifestSource},
    registry::{PackageIdentity, RegistryClient, lookup_identity},
    staging::{RestoreOutput, StagingArea, StagingDirectory},
};

use super::{PackageResolver, PreparedPackage};

/// Installs a package published in a registry
///
/// The package is restored into a private staging directory, and its
/// assemblies for the target framework are copied into the package folder.
#[derive(Debug)]
pub struct RegistryResolver<'a, RC, CR> {
    client: &'a RC,
    runner: &'a CR,
    reference: String,
    default_source_url: Option<String>,
    target_framework: String,
    staging: StagingArea,
}

impl<'a, RC, CR> RegistryResolver<'a, RC, CR>
where
    RC: RegistryClient,
    CR: CommandRunner,
{
    pub fn new(
        client: &'a RC,
        runner: &'a CR,
        reference: &str,
        default_source_url: Option<&str>,
        target_framework: &str,
        staging: StagingArea,
    ) -> Self {
        Self {
            client,
            runner,
            reference: reference.to_string(),
            default_source_url: default_source_url.map(str::to_string),
            target_framework: target_framework.to_string(),
            staging,
        }
    }
}

#[async_trait]
impl<'a, RC, CR> PackageResolver for RegistryResolver<'a, RC, CR>
where
    RC: RegistryClient,
    CR: CommandRunner,
{
    type Prepared = RegistryPackage;

    #[instrument(skip(self), fields(reference = %self.reference))]
    async fn prepare(&self, options: &AcquireOptions) -> Result<RegistryPackage, AcquireError> {
        let source_url = options
            .source_url
            .clone()
            .or_else(|| self.default_source_url.clone())
            .unwrap_or_default();

        let identity = lookup_identity(
            self.client,
            &self.reference,
            options.version.as_deref(),
            &source_url,
            &self.target_framework,
        )
        .await?;

        let staging = self.staging.create()?;
        let descriptor = staging.write_descriptor(&identity, &self.target_framework)?;

        let args = [
            descriptor.to_string_lossy().into_owned(),
            "--source".to_string(),
            source_url.clone(),
            "--verbosity".to_string(),
            "quiet".to_string(),
        ];
        if !run(self.runner, "restore", &args).await {
            return Err(AcquireError::RestoreFailed {
                target: identity.to_string(),
            });
        }

        let output = RestoreOutput::read(staging.path())?;
        let assemblies = output.assemblies_folder(&identity, &self.target_framework);
        let entry_point = find_entry_artifact(&assemblies)?;

        Ok(RegistryPackage {
            name: self.reference.clone(),
            identity,
            source_url,
            assemblies,
            entry_point,
            _staging: staging,
        })
    }
}

/// A restored registry package waiting to be copied into place
///
/// Owns its staging directory, which is removed when this is dropped.
#[derive(Debug)]
pub struct RegistryPackage {
    name: String,
    identity: PackageIdentity,
    source_url: String,
    assemblies: PathBuf,
    entry_point: String,
    _staging: StagingDirectory,
}

impl RegistryPackage {
    #[must_use]
    pub fn identity(&self) -> &PackageIdentity {
        &self.identity
    }

    #[must_use]
    pub fn assemblies(&self) -> &Path {
        &self.assemblies
    }
}

#[async_trait]
impl PreparedPackage for RegistryPackage {
    fn package_name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Option<&str> {
        Some(self.identity.version())
    }

    fn source(&self) -> ManifestSource {
        ManifestSource::Registry {
            url: self.source_url.clone(),
        }
    }

    async fn populate(&self, folder: &Path) -> Result<String, AcquireError> {
        debug!(
            from = %self.assemblies.display(),
            to = %folder.display(),
            "copying package assemblies"
        );
        copy_dir_recursive(&self.assemblies, folder)?;

        Ok(self.entry_point.clone())
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), AcquireError> {
    fs::create_dir_all(dst).map_err(AcquireError::io(dst))?;

    for entry in fs::read_dir(src).map_err(AcquireError::io(src))? {
        let entry = entry.map_err(AcquireError::io(src))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path).map_err(AcquireError::io(&dst_path))?;
        }
    }

    Ok(())
}
