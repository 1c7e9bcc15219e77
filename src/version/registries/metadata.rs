//! JSON metadata documents (PyPI JSON API, devpi JSON API)

use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use serde_json::Value;

use crate::version::error::ClientError;

/// Metadata document; PyPI fills `info` and `releases`, devpi fills `result`
#[derive(Debug, Deserialize)]
struct MetadataDocument {
    info: Option<LatestInfo>,
    releases: Option<IndexMap<String, Value>>,
    result: Option<IndexMap<String, Value>>,
}

/// Package information from the index
#[derive(Debug, Deserialize)]
struct LatestInfo {
    /// Latest version (according to the index)
    version: Option<String>,
}

/// Extract the published versions of `project` from a metadata document body.
///
/// PyPI releases without any uploaded file are skipped. The single
/// `info.version` field is only used when the document carries no release
/// mapping entries at all.
pub fn parse_metadata(project: &str, body: &str) -> Result<IndexSet<String>, ClientError> {
    let document: MetadataDocument = serde_json::from_str(body)
        .map_err(|e| ClientError::UnsupportedFormat(e.to_string()))?;

    let releases = document.releases.unwrap_or_default();
    let result = document.result.unwrap_or_default();
    let has_mapping = !releases.is_empty() || !result.is_empty();

    let mut versions: IndexSet<String> = releases
        .into_iter()
        .filter(|(_, files)| has_files(files))
        .map(|(version, _)| version)
        .chain(result.into_keys())
        .collect();

    if !has_mapping
        && let Some(latest) = document.info.and_then(|info| info.version)
    {
        versions.insert(latest);
    }

    if versions.is_empty() {
        return Err(ClientError::NotFound(project.to_string()));
    }

    Ok(versions)
}

/// A release counts when its file list is non-empty (or not a list at all)
fn has_files(files: &Value) -> bool {
    files.as_array().is_none_or(|files| !files.is_empty())
}
