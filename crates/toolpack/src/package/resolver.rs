//! Resolver strategies shared by the acquire template
//!
//! A [`PackageResolver`] does everything that can happen before the packages
//! directory is touched (lookup, restore, staging) and yields a
//! [`PreparedPackage`], which then fills the freshly created package folder.

pub mod folder;
pub mod registry;

pub use self::{
    folder::{BuiltPackage, FolderResolver},
    registry::{RegistryPackage, RegistryResolver},
};

use std::{fmt, path::Path};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{AcquireError, AcquireOptions, ManifestSource};

/// First half of an acquire: resolve the source into installable content
#[async_trait]
pub trait PackageResolver: Send + Sync {
    type Prepared: PreparedPackage;

    /// Resolve identity and produce everything needed to populate a folder
    ///
    /// # Errors
    ///
    /// Returns an [`AcquireError`] describing why the source cannot be
    /// installed. Nothing under the packages directory has been touched when
    /// this fails.
    async fn prepare(&self, options: &AcquireOptions) -> Result<Self::Prepared, AcquireError>;
}

/// Second half of an acquire: content ready to be installed
#[async_trait]
pub trait PreparedPackage: Send + Sync {
    /// Name of the folder to install into
    fn package_name(&self) -> &str;

    fn version(&self) -> Option<&str>;

    fn source(&self) -> ManifestSource;

    /// Fill `folder` and return the entry artifact's file name
    ///
    /// # Errors
    ///
    /// Returns an [`AcquireError`] if the folder cannot be populated or holds
    /// no entry point afterwards.
    async fn populate(&self, folder: &Path) -> Result<String, AcquireError>;
}

/// Progress of a single acquire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireStage {
    Start,
    Resolving,
    CollisionChecked,
    Installing,
    Done,
    Failed(String),
}

impl AcquireStage {
    /// Move to `next`, logging the transition
    pub fn advance(&mut self, next: AcquireStage) {
        match &next {
            AcquireStage::Failed(reason) => warn!(from = %self, %reason, "acquire failed"),
            _ => debug!(from = %self, to = %next, "acquire stage"),
        }
        *self = next;
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, AcquireStage::Done | AcquireStage::Failed(_))
    }
}

impl fmt::Display for AcquireStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquireStage::Start => f.write_str("start"),
            AcquireStage::Resolving => f.write_str("resolving"),
            AcquireStage::CollisionChecked => f.write_str("collision-checked"),
            AcquireStage::Installing => f.write_str("installing"),
            AcquireStage::Done => f.write_str("done"),
            AcquireStage::Failed(_) => f.write_str("failed"),
        }
    }
}
