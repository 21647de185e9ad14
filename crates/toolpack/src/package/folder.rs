use std::{
    collections::HashMap,
    fs, io,
    path::{Component, Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};

use super::{AcquireError, InstallManifest, MANIFEST_FILE_NAME};

/// The shared root holding one folder per installed package
#[derive(Debug, Clone)]
pub struct PackagesFolder {
    root: PathBuf,
}

impl PackagesFolder {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The folder `name` installs into, always an immediate child of the root
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::InvalidPackageName`] unless `name` is exactly one
    /// plain path component.
    pub fn package_folder(&self, name: &str) -> Result<PathBuf, AcquireError> {
        let mut components = Path::new(name).components();

        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) if part == name => Ok(self.root.join(name)),
            _ => Err(AcquireError::InvalidPackageName {
                package: name.to_string(),
                root: self.root.clone(),
            }),
        }
    }

    /// Whether `name` has a completed install
    #[must_use]
    pub fn is_installed(&self, name: &str) -> bool {
        self.package_folder(name)
            .is_ok_and(|folder| folder.join(MANIFEST_FILE_NAME).is_file())
    }

    /// Create the root if it does not exist yet
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::Io`] if the directory cannot be created.
    pub fn ensure_root(&self) -> Result<(), AcquireError> {
        fs::create_dir_all(&self.root).map_err(AcquireError::io(&self.root))
    }

    /// Fail if `name` is already installed; remove an incomplete install
    ///
    /// # Errors
    ///
    /// - [`AcquireError::InvalidPackageName`] if `name` would leave the root
    /// - [`AcquireError::PackageAlreadyExists`] if the folder holds the marker
    /// - [`AcquireError::Io`] if a stale folder cannot be removed
    pub fn check_collision(&self, name: &str) -> Result<(), AcquireError> {
        let folder = self.package_folder(name)?;

        if self.is_installed(name) {
            return Err(AcquireError::PackageAlreadyExists {
                package: name.to_string(),
                folder,
            });
        }

        let removed = match fs::symlink_metadata(&folder) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&folder),
            Ok(_) => fs::remove_file(&folder),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => Err(e),
        };

        removed.map_err(AcquireError::io(&folder))?;
        warn!(folder = %folder.display(), "removed incomplete install");

        Ok(())
    }

    /// Create the (empty) folder for `name`
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::InvalidPackageName`] for a name that would leave
    /// the root, [`AcquireError::Io`] if the folder cannot be created.
    pub fn create(&self, name: &str) -> Result<PathBuf, AcquireError> {
        let folder = self.package_folder(name)?;
        fs::create_dir(&folder).map_err(AcquireError::io(&folder))?;
        debug!(folder = %folder.display(), "created package folder");

        Ok(folder)
    }

    /// Write the completion marker into `folder`
    ///
    /// The marker is written to a temporary name and renamed into place so it
    /// is never observed half-written.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::Io`] if the marker cannot be written.
    pub fn write_manifest(
        &self,
        folder: &Path,
        manifest: &InstallManifest,
    ) -> Result<(), AcquireError> {
        let marker = folder.join(MANIFEST_FILE_NAME);
        let partial = folder.join(format!("{MANIFEST_FILE_NAME}.partial"));

        let contents = serde_json::to_vec_pretty(manifest)
            .map_err(|e| AcquireError::io(&marker)(io::Error::other(e)))?;
        fs::write(&partial, contents).map_err(AcquireError::io(&partial))?;
        fs::rename(&partial, &marker).map_err(AcquireError::io(&marker))?;

        debug!(marker = %marker.display(), "wrote install manifest");
        Ok(())
    }

    /// Read the marker of an installed package
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::InvalidPackageName`] for a name that would leave
    /// the root, [`AcquireError::Io`] if the marker exists but cannot be read
    /// or parsed.
    pub fn read_manifest(&self, name: &str) -> Result<Option<InstallManifest>, AcquireError> {
        let marker = self.package_folder(name)?.join(MANIFEST_FILE_NAME);

        let contents = match fs::read(&marker) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AcquireError::io(&marker)(e)),
        };

        serde_json::from_slice(&contents)
            .map(Some)
            .map_err(|e| AcquireError::io(&marker)(io::Error::other(e)))
    }
}

/// In-process locks keyed by lower-cased package name
///
/// Cloning shares the underlying table. Entries nobody holds or waits on are
/// pruned on the next `lock` call.
#[derive(Debug, Clone, Default)]
pub struct PackageLocks {
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl PackageLocks {
    /// Wait for exclusive access to `name`
    pub async fn lock(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Holders and waiters each own a clone
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(name.to_lowercase()).or_default())
        };

        lock.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
