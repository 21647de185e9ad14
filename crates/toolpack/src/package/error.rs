use std::{io, path::PathBuf};

use thiserror::Error;

use crate::registry::RegistryError;

/// Everything that can make an acquire fail
///
/// Every variant is fatal to the current call and renders as a single line
/// carrying enough context (package, version, target, path) to act on.
#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Package '{package}' was not found in registry {source_url}")]
    Resolution { package: String, source_url: String },

    #[error("Package '{package}' {version} does not support target framework '{target_framework}'")]
    Compatibility {
        package: String,
        version: String,
        target_framework: String,
    },

    #[error("Malformed project descriptor {}: {reason}", path.display())]
    MalformedDescriptor { path: PathBuf, reason: String },

    #[error("Restore failed for '{target}'")]
    RestoreFailed { target: String },

    #[error("Build failed for project {}", descriptor.display())]
    BuildFailed { descriptor: PathBuf },

    #[error("No assembly with an entry point found in {}", directory.display())]
    EntryPointNotFound { directory: PathBuf },

    #[error("Package '{package}' is already installed at {}", folder.display())]
    PackageAlreadyExists { package: String, folder: PathBuf },

    #[error("Package name '{package}' is not a single folder name inside {}", root.display())]
    InvalidPackageName { package: String, root: PathBuf },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Unreadable restore output {}: {reason}", path.display())]
    RestoreOutput { path: PathBuf, reason: String },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AcquireError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
