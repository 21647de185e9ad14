use tracing::{debug, instrument};

use crate::package::AcquireError;

use super::{PackageIdentity, RegistryClient};

/// Resolve `reference` to one installable identity
///
/// With a `version` the entry whose version string matches exactly wins.
/// Otherwise, and when no entry matches, the last entry in registry order is
/// taken; that is not necessarily the highest version.
///
/// # Errors
///
/// - [`AcquireError::Configuration`] if `source_url` is blank
/// - [`AcquireError::Resolution`] if the registry has no entries for `reference`
/// - [`AcquireError::Compatibility`] if the selected entry does not target
///   `target_framework`
/// - [`AcquireError::Registry`] if the registry could not be queried
#[instrument(skip(client))]
pub async fn lookup_identity<RC>(
    client: &RC,
    reference: &str,
    version: Option<&str>,
    source_url: &str,
    target_framework: &str,
) -> Result<PackageIdentity, AcquireError>
where
    RC: RegistryClient + ?Sized,
{
    if source_url.trim().is_empty() {
        return Err(AcquireError::Configuration(
            "no registry source URL configured".to_string(),
        ));
    }

    let entries = client.find_packages(source_url, reference).await?;

    let selected = version
        .and_then(|wanted| entries.iter().find(|entry| entry.version == wanted))
        .or_else(|| entries.last())
        .ok_or_else(|| AcquireError::Resolution {
            package: reference.to_string(),
            source_url: source_url.to_string(),
        })?;

    if version.is_some_and(|wanted| wanted != selected.version) {
        debug!(
            requested = version,
            selected = %selected.version,
            "requested version not published; using last registry entry"
        );
    }

    if !selected.supports_framework(target_framework) {
        return Err(AcquireError::Compatibility {
            package: selected.id.clone(),
            version: selected.version.clone(),
            target_framework: target_framework.to_string(),
        });
    }

    let identity = selected.identity();
    debug!(%identity, "resolved package identity");

    Ok(identity)
}
