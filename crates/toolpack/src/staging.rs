//! Per-acquire staging directories
//!
//! Every registry acquire restores into its own freshly created directory
//! under the staging root. The directory is removed when the
//! [`StagingDirectory`] handle is dropped, whether the acquire succeeded or
//! not.

pub mod restore_output;

pub use self::restore_output::RestoreOutput;

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::{package::AcquireError, registry::PackageIdentity};

const STAGING_PREFIX: &str = "toolpack-";
const RESTORE_DESCRIPTOR: &str = "restore.csproj";

/// Absolute system temp directory
///
/// `env::temp_dir()` can be relative when `TMPDIR` is; fall back to the
/// platform default in that case.
#[must_use]
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            env::var("TEMP")
                .or_else(|_| env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}

/// Hands out uniquely named staging directories below `root`
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a new, empty staging directory
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::Io`] if the directory cannot be created.
    pub fn create(&self) -> Result<StagingDirectory, AcquireError> {
        fs::create_dir_all(&self.root).map_err(AcquireError::io(&self.root))?;

        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.root)
            .map_err(AcquireError::io(&self.root))?;
        debug!(path = %dir.path().display(), "created staging directory");

        Ok(StagingDirectory {
            path: dir.path().to_path_buf(),
            dir: Some(dir),
        })
    }
}

/// A staging directory owned by exactly one acquire
#[derive(Debug)]
pub struct StagingDirectory {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl StagingDirectory {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a restore project that references exactly `identity` for
    /// `target_framework`; returns the descriptor's path
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::Io`] if the file cannot be written.
    pub fn write_descriptor(
        &self,
        identity: &PackageIdentity,
        target_framework: &str,
    ) -> Result<PathBuf, AcquireError> {
        let descriptor = self.path.join(RESTORE_DESCRIPTOR);
        let contents = restore_descriptor(identity, target_framework);

        fs::write(&descriptor, contents).map_err(AcquireError::io(&descriptor))?;
        debug!(descriptor = %descriptor.display(), %identity, "wrote restore descriptor");

        Ok(descriptor)
    }

    /// Remove the directory and everything in it
    ///
    /// Failures are logged and otherwise ignored. Calling this more than once
    /// is harmless.
    pub fn cleanup(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        match dir.close() {
            Ok(()) => debug!(path = %self.path.display(), "removed staging directory"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(error) => warn!(
                path = %self.path.display(),
                %error,
                "failed to remove staging directory"
            ),
        }
    }
}

impl Drop for StagingDirectory {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn restore_descriptor(identity: &PackageIdentity, target_framework: &str) -> String {
    format!(
        r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>{tfm}</TargetFramework>
    <DisableImplicitNuGetFallbackFolder>true</DisableImplicitNuGetFallbackFolder>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="{name}" Version="[{version}]" />
  </ItemGroup>
</Project>
"#,
        tfm = xml_escape(target_framework),
        name = xml_escape(identity.name()),
        version = xml_escape(identity.version()),
    )
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
