//! Common types for lock-file and manifest readers

use std::collections::HashSet;
use std::str::FromStr;

use pep508_rs::PackageName;

/// Kind of source a locked package was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Package index (poetry `legacy` sources)
    Registry,
    /// Version-control checkout (poetry `git` sources)
    VersionControl,
    /// Direct reference to an archive or a local path (`url`, `file`, `directory`)
    Direct,
}

impl SourceKind {
    /// Returns the string representation used in lock files
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Registry => "legacy",
            SourceKind::VersionControl => "git",
            SourceKind::Direct => "direct",
        }
    }

    /// Maps a lock-file source `type` onto a kind.
    ///
    /// Unknown types are treated as registries, since every other poetry source
    /// type names an index URL.
    pub fn from_lock_type(source_type: &str) -> Self {
        match source_type {
            "git" => SourceKind::VersionControl,
            "url" | "file" | "directory" => SourceKind::Direct,
            _ => SourceKind::Registry,
        }
    }
}

/// Source descriptor attached to a locked package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSource {
    pub kind: SourceKind,
    /// Index URL, repository URL or path, depending on `kind`
    pub url: String,
    /// Branch, tag or index name recorded by the lock file
    pub reference: Option<String>,
}

/// A package pinned by the lock file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedPackage {
    /// Package name as written in the lock file (e.g., "requests")
    pub name: String,
    /// Pinned version (e.g., "2.31.0")
    pub version: String,
    /// Where the package comes from; `None` means the public registry
    pub source: Option<PackageSource>,
}

impl LockedPackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, kind: SourceKind, url: impl Into<String>) -> Self {
        self.source = Some(PackageSource {
            kind,
            url: url.into(),
            reference: None,
        });
        self
    }
}

/// Names of the dependencies declared directly in the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectDependencies {
    names: HashSet<String>,
}

impl DirectDependencies {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| normalize_package_name(name.as_ref()))
                .collect(),
        }
    }

    /// Case-insensitive, separator-insensitive membership test
    pub fn contains(&self, package_name: &str) -> bool {
        self.names.contains(&normalize_package_name(package_name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Normalize a project name the way package indexes do (PEP 503).
///
/// Names that are not valid project names are only lower-cased.
pub fn normalize_package_name(name: &str) -> String {
    let name = name.trim();
    PackageName::from_str(name)
        .map(|normalized| normalized.to_string())
        .unwrap_or_else(|_| name.to_lowercase())
}
