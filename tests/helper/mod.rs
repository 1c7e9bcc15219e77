//! Test utilities shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;

use async_trait::async_trait;
use indexmap::IndexSet;
use tempfile::NamedTempFile;

use deps_scanner::version::error::ClientError;
use deps_scanner::version::origin::IndexEndpoint;
use deps_scanner::version::registry::IndexClient;

/// Index client answering from canned per-package results
#[derive(Default)]
pub struct StubIndexClient {
    responses: HashMap<String, Result<Vec<String>, ClientError>>,
    panic_on: Option<String>,
}

impl StubIndexClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_versions(mut self, package: &str, versions: Vec<&str>) -> Self {
        self.responses.insert(
            package.to_string(),
            Ok(versions.into_iter().map(|v| v.to_string()).collect()),
        );
        self
    }

    pub fn with_error(mut self, package: &str, error: ClientError) -> Self {
        self.responses.insert(package.to_string(), Err(error));
        self
    }

    /// Panic inside the fetch for `package`
    pub fn panicking_on(mut self, package: &str) -> Self {
        self.panic_on = Some(package.to_string());
        self
    }
}

#[async_trait]
impl IndexClient for StubIndexClient {
    async fn fetch_versions(
        &self,
        _endpoint: &IndexEndpoint,
        package_name: &str,
    ) -> Result<IndexSet<String>, ClientError> {
        if self.panic_on.as_deref() == Some(package_name) {
            panic!("index client blew up for {}", package_name);
        }

        match self.responses.get(package_name) {
            Some(Ok(versions)) => Ok(versions.iter().cloned().collect()),
            Some(Err(e)) => Err(e.clone()),
            None => Err(ClientError::NotFound(package_name.to_string())),
        }
    }
}

/// Write `content` to a temporary file that lives as long as the handle
pub fn write_temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}
