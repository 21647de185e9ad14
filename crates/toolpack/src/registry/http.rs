// HTTP registry adapter implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, trace};
use url::Url;

use super::{PackageMetadata, RegistryClient, RegistryError};

const USER_AGENT: &str = concat!("toolpack/", env!("CARGO_PKG_VERSION"));

/// Registration index document: `<source>/<lower id>/index.json`
#[derive(Debug, Deserialize)]
struct RegistrationIndex {
    #[serde(default)]
    items: Vec<RegistrationPage>,
}

/// A page of the index; large indexes leave `items` out and link the page
#[derive(Debug, Deserialize)]
struct RegistrationPage {
    #[serde(rename = "@id")]
    id: String,

    #[serde(default)]
    items: Option<Vec<RegistrationLeaf>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationLeaf {
    catalog_entry: PackageMetadata,
}

/// [`RegistryClient`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    client: reqwest::Client,
}

impl HttpRegistryClient {
    /// Build a client whose requests give up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Client`] if the TLS backend cannot be
    /// initialized.
    pub fn new(timeout: Duration) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(RegistryError::Client)?;

        Ok(Self { client })
    }

    fn index_url(source_url: &str, name: &str) -> Result<Url, RegistryError> {
        let raw = format!(
            "{}/{}/index.json",
            source_url.trim().trim_end_matches('/'),
            name.to_lowercase()
        );

        Url::parse(&raw).map_err(|e| RegistryError::InvalidUrl {
            url: source_url.to_string(),
            reason: e.to_string(),
        })
    }

    /// GET a JSON document; `Ok(None)` for a 404
    async fn fetch<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<T>, RegistryError> {
        trace!(%url, "registry request");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| RegistryError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RegistryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| RegistryError::Request {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| RegistryError::Malformed {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn page_leaves(
        &self,
        page: RegistrationPage,
    ) -> Result<Vec<RegistrationLeaf>, RegistryError> {
        if let Some(items) = page.items {
            return Ok(items);
        }

        let url = Url::parse(&page.id).map_err(|e| RegistryError::Malformed {
            url: page.id.clone(),
            reason: format!("page link is not a URL: {e}"),
        })?;

        debug!(%url, "fetching registration page");
        let page: Option<RegistrationPage> = self.fetch(&url).await?;

        Ok(page.and_then(|p| p.items).unwrap_or_default())
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn find_packages(
        &self,
        source_url: &str,
        name: &str,
    ) -> Result<Vec<PackageMetadata>, RegistryError> {
        let url = Self::index_url(source_url, name)?;
        debug!(%url, package = name, "querying registry");

        let Some(index) = self.fetch::<RegistrationIndex>(&url).await? else {
            debug!(package = name, "registry has no index for package");
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for page in index.items {
            for leaf in self.page_leaves(page).await? {
                let entry = leaf.catalog_entry;
                if entry.listed && entry.id.eq_ignore_ascii_case(name) {
                    entries.push(entry);
                }
            }
        }

        debug!(package = name, count = entries.len(), "registry entries found");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use pretty_assertions::assert_eq;

    fn client() -> HttpRegistryClient {
        HttpRegistryClient::new(Duration::from_secs(5)).unwrap()
    }

    fn leaf(id: &str, version: &str, listed: bool) -> String {
        format!(
            r#"{{ "catalogEntry": {{ "id": "{id}", "version": "{version}", "listed": {listed},
                "dependencyGroups": [ {{ "targetFramework": "net8.0" }} ] }} }}"#
        )
    }

    fn versions(entries: &[PackageMetadata]) -> Vec<&str> {
        entries.iter().map(|e| e.version.as_str()).collect()
    }

    #[tokio::test]
    async fn test_find_packages_inline_pages() {
        let mut server = Server::new_async().await;
        let body = format!(
            r#"{{ "items": [ {{ "@id": "{url}/contoso.tool/page/1", "items": [ {a}, {b} ] }} ] }}"#,
            url = server.url(),
            a = leaf("Contoso.Tool", "1.0.0", true),
            b = leaf("Contoso.Tool", "1.2.0-beta", true),
        );
        let _m = server
            .mock("GET", "/contoso.tool/index.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let entries = client()
            .find_packages(&server.url(), "Contoso.Tool")
            .await
            .unwrap();

        assert_eq!(versions(&entries), vec!["1.0.0", "1.2.0-beta"]);
        assert_eq!(entries[0].id, "Contoso.Tool");
    }

    #[tokio::test]
    async fn test_find_packages_follows_page_links() {
        let mut server = Server::new_async().await;
        let index = format!(
            r#"{{ "items": [
                {{ "@id": "{url}/contoso.tool/page/1", "items": [ {a} ] }},
                {{ "@id": "{url}/contoso.tool/page/2" }}
            ] }}"#,
            url = server.url(),
            a = leaf("Contoso.Tool", "1.0.0", true),
        );
        let page = format!(
            r#"{{ "@id": "{url}/contoso.tool/page/2", "items": [ {b} ] }}"#,
            url = server.url(),
            b = leaf("Contoso.Tool", "2.0.0", true),
        );
        let _index = server
            .mock("GET", "/contoso.tool/index.json")
            .with_status(200)
            .with_body(index)
            .create_async()
            .await;
        let _page = server
            .mock("GET", "/contoso.tool/page/2")
            .with_status(200)
            .with_body(page)
            .create_async()
            .await;

        let entries = client()
            .find_packages(&server.url(), "contoso.tool")
            .await
            .unwrap();

        assert_eq!(versions(&entries), vec!["1.0.0", "2.0.0"]);
    }

    #[tokio::test]
    async fn test_find_packages_excludes_unlisted_and_other_ids() {
        let mut server = Server::new_async().await;
        let body = format!(
            r#"{{ "items": [ {{ "@id": "p1", "items": [ {a}, {b}, {c} ] }} ] }}"#,
            a = leaf("Contoso.Tool", "1.0.0", false),
            b = leaf("Contoso.Tool.Extras", "1.1.0", true),
            c = leaf("CONTOSO.TOOL", "1.2.0", true),
        );
        let _m = server
            .mock("GET", "/contoso.tool/index.json")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let entries = client()
            .find_packages(&server.url(), "Contoso.Tool")
            .await
            .unwrap();

        assert_eq!(versions(&entries), vec!["1.2.0"]);
    }

    #[tokio::test]
    async fn test_find_packages_not_found_is_empty() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/missing/index.json")
            .with_status(404)
            .create_async()
            .await;

        let entries = client()
            .find_packages(&format!("{}/", server.url()), "Missing")
            .await
            .unwrap();

        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_find_packages_server_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/contoso.tool/index.json")
            .with_status(503)
            .create_async()
            .await;

        let result = client().find_packages(&server.url(), "Contoso.Tool").await;

        assert!(matches!(
            result,
            Err(RegistryError::Status { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_find_packages_malformed_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/contoso.tool/index.json")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let result = client().find_packages(&server.url(), "Contoso.Tool").await;

        assert!(matches!(result, Err(RegistryError::Malformed { .. })));
    }

    #[tokio::test]
    async fn test_find_packages_invalid_source_url() {
        let result = client().find_packages("not a url", "Contoso.Tool").await;

        assert!(matches!(result, Err(RegistryError::InvalidUrl { .. })));
    }
}
