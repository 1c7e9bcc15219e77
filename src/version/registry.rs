//! Index client trait for fetching published versions

use indexmap::IndexSet;
#[cfg(test)]
use mockall::automock;

use crate::version::error::ClientError;
use crate::version::origin::IndexEndpoint;

/// Trait for fetching the published versions of a package from an index
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait IndexClient: Send + Sync {
    /// Fetches every published version of a package
    ///
    /// # Arguments
    /// * `endpoint` - Resolved index endpoint, which also fixes the response shape
    /// * `package_name` - The name of the package as written in the lock file
    ///
    /// # Returns
    /// * `Ok(IndexSet<String>)` - Distinct version strings, in index order
    /// * `Err(ClientError)` - If the request or the response is unusable
    async fn fetch_versions(
        &self,
        endpoint: &IndexEndpoint,
        package_name: &str,
    ) -> Result<IndexSet<String>, ClientError>;
}
