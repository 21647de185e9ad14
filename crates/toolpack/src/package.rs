//! Package acquisition domain
//!
//! [`PackageService::acquire`](service::PackageService::acquire) takes a
//! package source (a registry reference or a local project folder), picks the
//! matching resolver and installs the result into its own folder under the
//! packages directory. A package folder is complete exactly when it holds the
//! [`MANIFEST_FILE_NAME`] marker.

pub mod error;
pub mod folder;
pub mod resolver;
pub mod service;

pub use self::{
    error::AcquireError,
    folder::{PackageLocks, PackagesFolder},
    service::{PackageService, PackageServiceImpl},
};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::fs::FileSystem;

/// Marker written into a package folder once installation has fully succeeded
pub const MANIFEST_FILE_NAME: &str = ".toolpack-manifest.json";

/// Where a package comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    /// A package id to look up in a registry
    Registry { name: String },

    /// A local folder holding a project descriptor
    Folder { path: PathBuf },
}

impl PackageSource {
    /// Classify a raw source argument: an existing directory is a folder
    /// source, anything else is a registry reference
    pub fn detect<F: FileSystem>(fs: &F, raw: &str) -> Self {
        let path = Path::new(raw);

        if fs.is_directory(path) {
            Self::Folder {
                path: path.to_path_buf(),
            }
        } else {
            Self::Registry {
                name: raw.to_string(),
            }
        }
    }
}

/// Caller-supplied knobs for a single acquire
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquireOptions {
    /// Registry to query; falls back to the configured registry
    pub source_url: Option<String>,

    /// Exact version to install; falls back to the registry's last entry
    pub version: Option<String>,
}

impl AcquireOptions {
    #[must_use]
    pub fn with_source_url(mut self, url: &str) -> Self {
        self.source_url = Some(url.to_string());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }
}

/// Result of a successful acquire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredPackage {
    name: String,
    version: Option<String>,
    folder: PathBuf,
    entry_point: String,
}

impl AcquiredPackage {
    pub(crate) fn new(
        name: String,
        version: Option<String>,
        folder: PathBuf,
        entry_point: String,
    ) -> Self {
        Self {
            name,
            version,
            folder,
            entry_point,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Installed version; `None` for packages built from a folder
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// File name of the runnable assembly inside [`Self::folder`]
    #[must_use]
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Absolute path of the entry assembly
    #[must_use]
    pub fn entry_point_path(&self) -> PathBuf {
        self.folder.join(&self.entry_point)
    }
}

/// Contents of the [`MANIFEST_FILE_NAME`] marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallManifest {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    pub entry_point: String,
    pub target_framework: String,
    pub source: ManifestSource,
}

/// Recorded origin of an installed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ManifestSource {
    Registry { url: String },
    Folder { path: PathBuf },
}
