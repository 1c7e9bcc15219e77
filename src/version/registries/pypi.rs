//! HTTP index client for PyPI-compatible package indexes

use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexSet;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;

use crate::config::USER_AGENT;
use crate::version::error::ClientError;
use crate::version::origin::IndexEndpoint;
use crate::version::registries::metadata::parse_metadata;
use crate::version::registries::simple_page::{SIMPLE_ACCEPT, SimplePageParser};
use crate::version::registry::IndexClient;

/// Index client speaking both the simple API and the JSON metadata APIs
pub struct PypiIndexClient {
    client: Client,
    simple_parser: SimplePageParser,
}

impl PypiIndexClient {
    /// Creates a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            simple_parser: SimplePageParser::new(),
        })
    }
}

#[async_trait]
impl IndexClient for PypiIndexClient {
    async fn fetch_versions(
        &self,
        endpoint: &IndexEndpoint,
        package_name: &str,
    ) -> Result<IndexSet<String>, ClientError> {
        let url = endpoint.project_url(package_name);
        let accept = match endpoint {
            IndexEndpoint::SimpleIndexPage { .. } => SIMPLE_ACCEPT,
            IndexEndpoint::MetadataDocument { .. } => "application/json",
        };
        debug!("Fetching index data: {}", url);

        let response = self.client.get(&url).header(ACCEPT, accept).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(package_name.to_string()));
        }

        if !status.is_success() {
            debug!("Index returned status {}: {}", status, url);
            return Err(ClientError::Http(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        let versions = match endpoint {
            IndexEndpoint::SimpleIndexPage { .. } => {
                self.simple_parser
                    .parse(package_name, content_type.as_deref(), &body)?
            }
            IndexEndpoint::MetadataDocument { .. } => parse_metadata(package_name, &body)?,
        };

        debug!(
            "Found {} versions for package {}",
            versions.len(),
            package_name
        );

        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::error::ErrorKind;
    use crate::version::origin::MetadataLayout;
    use mockito::{Matcher, Server};
    use tokio::net::TcpListener;

    fn client() -> PypiIndexClient {
        PypiIndexClient::new(Duration::from_secs(5)).unwrap()
    }

    fn warehouse(base_url: &str) -> IndexEndpoint {
        IndexEndpoint::MetadataDocument {
            base_url: format!("{}/pypi/", base_url),
            layout: MetadataLayout::Warehouse,
        }
    }

    #[tokio::test]
    async fn fetch_versions_returns_versions_from_releases() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/pypi/requests/json")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "info": {"version": "2.32.5"},
                    "releases": {
                        "2.31.0": [{"filename": "requests-2.31.0.tar.gz"}],
                        "2.32.0": [{"filename": "requests-2.32.0.tar.gz"}],
                        "2.32.5": [{"filename": "requests-2.32.5.tar.gz"}]
                    }
                }"#,
            )
            .create_async()
            .await;

        let result = client()
            .fetch_versions(&warehouse(&server.url()), "requests")
            .await
            .unwrap();

        mock.assert_async().await;

        let mut versions: Vec<_> = result.into_iter().collect();
        versions.sort();
        assert_eq!(versions, vec!["2.31.0", "2.32.0", "2.32.5"]);
    }

    #[tokio::test]
    async fn fetch_versions_returns_not_found_for_missing_package() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/pypi/nonexistent/json")
            .with_status(404)
            .create_async()
            .await;

        let result = client()
            .fetch_versions(&warehouse(&server.url()), "nonexistent")
            .await;

        mock.assert_async().await;

        assert!(matches!(result, Err(ClientError::NotFound(_))));
    }

    #[tokio::test]
    async fn fetch_versions_returns_http_error_for_server_failure() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/pypi/requests/json")
            .with_status(503)
            .create_async()
            .await;

        let result = client()
            .fetch_versions(&warehouse(&server.url()), "requests")
            .await;

        mock.assert_async().await;

        assert!(matches!(result, Err(ClientError::Http(503))));
    }

    #[tokio::test]
    async fn fetch_versions_returns_unsupported_format_for_non_json_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/pypi/requests/json")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let result = client()
            .fetch_versions(&warehouse(&server.url()), "requests")
            .await;

        mock.assert_async().await;

        assert!(matches!(result, Err(ClientError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn fetch_versions_reads_devpi_document() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/team/dev/internal-lib")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"type": "projectconfig", "result": {"1.3.0": {}, "1.4.0": {}}}"#)
            .create_async()
            .await;

        let endpoint = IndexEndpoint::MetadataDocument {
            base_url: format!("{}/team/dev/", server.url()),
            layout: MetadataLayout::Devpi,
        };
        let result = client()
            .fetch_versions(&endpoint, "internal-lib")
            .await
            .unwrap();

        mock.assert_async().await;

        assert_eq!(result.into_iter().collect::<Vec<_>>(), vec!["1.3.0", "1.4.0"]);
    }

    #[tokio::test]
    async fn fetch_versions_reads_simple_html_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/simple/internal-lib/")
            .match_header("accept", Matcher::Regex("vnd.pypi.simple.v1\\+json".to_string()))
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(
                r#"<html><body>
<a href="/files/internal_lib-1.3.0-py3-none-any.whl">internal_lib-1.3.0-py3-none-any.whl</a>
<a href="/files/internal-lib-1.4.0.tar.gz">internal-lib-1.4.0.tar.gz</a>
</body></html>"#,
            )
            .create_async()
            .await;

        let endpoint = IndexEndpoint::SimpleIndexPage {
            base_url: format!("{}/simple/", server.url()),
        };
        let result = client()
            .fetch_versions(&endpoint, "internal-lib")
            .await
            .unwrap();

        mock.assert_async().await;

        assert_eq!(result.into_iter().collect::<Vec<_>>(), vec!["1.3.0", "1.4.0"]);
    }

    #[tokio::test]
    async fn fetch_versions_reads_simple_json_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/simple/internal-lib/")
            .with_status(200)
            .with_header("content-type", "application/vnd.pypi.simple.v1+json")
            .with_body(r#"{"meta": {"api-version": "1.1"}, "name": "internal-lib", "versions": ["1.3.0", "1.4.0"], "files": []}"#)
            .create_async()
            .await;

        let endpoint = IndexEndpoint::SimpleIndexPage {
            base_url: format!("{}/simple/", server.url()),
        };
        let result = client()
            .fetch_versions(&endpoint, "internal-lib")
            .await
            .unwrap();

        mock.assert_async().await;

        assert_eq!(result.into_iter().collect::<Vec<_>>(), vec!["1.3.0", "1.4.0"]);
    }

    #[tokio::test]
    async fn fetch_versions_requests_simple_page_under_normalized_name() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/simple/zope-interface/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(
                r#"<html><body>
<a href="/files/zope.interface-5.5.2.tar.gz">zope.interface-5.5.2.tar.gz</a>
<a href="/files/zope_interface-6.0-cp311-cp311-manylinux_2_17_x86_64.whl">zope_interface-6.0-cp311-cp311-manylinux_2_17_x86_64.whl</a>
</body></html>"#,
            )
            .create_async()
            .await;

        let endpoint = IndexEndpoint::SimpleIndexPage {
            base_url: format!("{}/simple/", server.url()),
        };
        let result = client()
            .fetch_versions(&endpoint, "zope.interface")
            .await
            .unwrap();

        mock.assert_async().await;

        assert_eq!(result.into_iter().collect::<Vec<_>>(), vec!["5.5.2", "6.0"]);
    }

    #[tokio::test]
    async fn fetch_versions_handles_network_error() {
        // Port out of range, so the request never leaves the client
        let endpoint = warehouse("http://invalid.localhost.test:99999");
        let result = client().fetch_versions(&endpoint, "requests").await;

        assert!(matches!(result, Err(ClientError::Network(_))));
    }

    #[tokio::test]
    async fn fetch_versions_returns_timeout_when_index_never_answers() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let silent_server = tokio::spawn(async move {
            let mut connections = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                connections.push(socket);
            }
        });

        let client = PypiIndexClient::new(Duration::from_millis(300)).unwrap();
        let endpoint = warehouse(&format!("http://{}", addr));
        let result = client.fetch_versions(&endpoint, "requests").await;

        silent_server.abort();

        assert!(matches!(result, Err(ClientError::Timeout(_))));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Timeout);
    }
}
