use async_trait::async_trait;

use super::{PackageMetadata, RegistryError};

/// Port for querying a package registry
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Return every published version of `name`, in registry order
    ///
    /// Matching on the id is case-insensitive. Prerelease versions are
    /// included; unlisted versions are not. An unknown package yields an empty
    /// list rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the registry cannot be reached or answers
    /// with something other than a registration index.
    async fn find_packages(
        &self,
        source_url: &str,
        name: &str,
    ) -> Result<Vec<PackageMetadata>, RegistryError>;
}
