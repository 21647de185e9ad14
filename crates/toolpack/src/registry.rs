//! Package registry access
//!
//! The registry is queried through the [`RegistryClient`] port. The
//! [`HttpRegistryClient`] adapter speaks the registration-index JSON shape;
//! [`lookup_identity`] turns the raw entries into a single installable
//! [`PackageIdentity`].

pub mod client;
pub mod http;
pub mod lookup;

pub use self::{
    client::RegistryClient,
    http::HttpRegistryClient,
    lookup::lookup_identity,
};

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Name and exact version of a package as published by the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageIdentity {
    name: String,
    version: String,
}

impl PackageIdentity {
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// One published version of a package
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    pub id: String,
    pub version: String,

    #[serde(default = "listed_default")]
    pub listed: bool,

    #[serde(default)]
    pub dependency_groups: Vec<DependencyGroup>,
}

fn listed_default() -> bool {
    true
}

impl PackageMetadata {
    #[must_use]
    pub fn identity(&self) -> PackageIdentity {
        PackageIdentity::new(&self.id, &self.version)
    }

    /// Whether any dependency group targets `moniker` (case-insensitive)
    #[must_use]
    pub fn supports_framework(&self, moniker: &str) -> bool {
        self.dependency_groups.iter().any(|group| {
            group
                .target_framework
                .as_deref()
                .is_some_and(|tf| tf.eq_ignore_ascii_case(moniker))
        })
    }
}

/// Dependencies declared for one target framework
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGroup {
    #[serde(default)]
    pub target_framework: Option<String>,

    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Dependency {
    pub id: String,

    #[serde(default)]
    pub range: Option<String>,
}

/// Errors raised while talking to a registry
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid registry URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Registry request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Registry returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Registry response from {url} could not be parsed: {reason}")]
    Malformed { url: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_deserializes_catalog_entry() {
        let json = r#"{
            "id": "Contoso.Tool",
            "version": "1.2.0",
            "listed": false,
            "dependencyGroups": [
                { "targetFramework": "net8.0", "dependencies": [ { "id": "Newtonsoft.Json", "range": "[13.0.1, )" } ] },
                { "targetFramework": "netstandard2.0" }
            ]
        }"#;

        let metadata: PackageMetadata = serde_json::from_str(json).unwrap();

        assert_eq!(metadata.identity(), PackageIdentity::new("Contoso.Tool", "1.2.0"));
        assert!(!metadata.listed);
        assert_eq!(metadata.dependency_groups.len(), 2);
        assert_eq!(
            metadata.dependency_groups[0].dependencies[0].range.as_deref(),
            Some("[13.0.1, )")
        );
        assert!(metadata.dependency_groups[1].dependencies.is_empty());
    }

    #[test]
    fn test_metadata_listed_by_default() {
        let metadata: PackageMetadata =
            serde_json::from_str(r#"{ "id": "A", "version": "1.0.0" }"#).unwrap();

        assert!(metadata.listed);
        assert!(metadata.dependency_groups.is_empty());
    }

    #[test]
    fn test_supports_framework_ignores_case() {
        let metadata = PackageMetadata {
            id: "A".to_string(),
            version: "1.0.0".to_string(),
            listed: true,
            dependency_groups: vec![
                DependencyGroup::default(),
                DependencyGroup {
                    target_framework: Some("NET8.0".to_string()),
                    dependencies: Vec::new(),
                },
            ],
        };

        assert!(metadata.supports_framework("net8.0"));
        assert!(!metadata.supports_framework("net6.0"));
    }

    #[test]
    fn test_identity_display() {
        assert_eq!(
            PackageIdentity::new("Contoso.Tool", "2.0.0").to_string(),
            "Contoso.Tool 2.0.0"
        );
    }
}
