//! poetry.lock reader
//!
//! Only the `[[package]]` array is read; every other table (metadata, hashes,
//! extras) is ignored.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::parser::error::ParseError;
use crate::parser::types::{LockedPackage, PackageSource, SourceKind};

#[derive(Debug, Deserialize)]
struct LockDocument {
    #[serde(default)]
    package: Vec<LockEntry>,
}

#[derive(Debug, Deserialize)]
struct LockEntry {
    name: String,
    version: String,
    source: Option<LockSource>,
}

#[derive(Debug, Deserialize)]
struct LockSource {
    #[serde(rename = "type")]
    source_type: String,
    url: String,
    reference: Option<String>,
}

impl From<LockEntry> for LockedPackage {
    fn from(entry: LockEntry) -> Self {
        LockedPackage {
            name: entry.name,
            version: entry.version,
            source: entry.source.map(|source| PackageSource {
                kind: SourceKind::from_lock_type(&source.source_type),
                url: source.url,
                reference: source.reference,
            }),
        }
    }
}

/// Parse lock-file content into locked packages, in file order
pub fn parse_lock_file(content: &str) -> Result<Vec<LockedPackage>, ParseError> {
    let document: LockDocument = toml::from_str(content)?;
    debug!("Lock file lists {} packages", document.package.len());

    Ok(document
        .package
        .into_iter()
        .map(LockedPackage::from)
        .collect())
}

/// Read and parse the lock file at `path`
pub fn load_lock_file(path: &Path) -> Result<Vec<LockedPackage>, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_lock_file(&content)
}
