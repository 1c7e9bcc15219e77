//! Package origin resolution
//!
//! Decides, per locked package, which index endpoint answers for it and which
//! response shape that endpoint serves. Packages that cannot be looked up on
//! any index (git checkouts, archives, local paths) are reported as
//! incomparable before any request is made.

use reqwest::Url;

use crate::config::DEFAULT_PUBLIC_INDEX_URL;
use crate::parser::types::{LockedPackage, SourceKind, normalize_package_name};

/// Label shown for packages resolved against the public registry
pub const PUBLIC_LABEL: &str = "public";

const COMPARE_FAILED_REASON: &str = "Couldn't compare versions.";

/// Hosts that are the public registry whatever path they are reached through
const PUBLIC_HOSTS: [&str; 2] = ["pypi.org", "pypi.python.org"];

/// Path of the public-registry mirror on devpi servers
const DEVPI_PUBLIC_MIRROR_PATH: &str = "/root/pypi/";

/// Marker devpi appends to index URLs to select the simple API
const DEVPI_SIMPLE_MARKER: &str = "+simple";

/// Layout of a JSON metadata API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataLayout {
    /// PyPI JSON API: `{base}{name}/json`, versions under `releases`
    Warehouse,
    /// devpi JSON API: `{base}{name}`, versions under `result`
    Devpi,
}

/// Index endpoint together with the response shape it serves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEndpoint {
    /// PEP 503 / PEP 691 project pages under `base_url`
    SimpleIndexPage { base_url: String },
    /// JSON metadata documents under `base_url`
    MetadataDocument {
        base_url: String,
        layout: MetadataLayout,
    },
}

impl IndexEndpoint {
    /// URL of the document describing `package_name`
    ///
    /// Simple project pages live under the normalized name.
    pub fn project_url(&self, package_name: &str) -> String {
        match self {
            IndexEndpoint::SimpleIndexPage { base_url } => {
                format!("{}{}/", base_url, normalize_package_name(package_name))
            }
            IndexEndpoint::MetadataDocument {
                base_url,
                layout: MetadataLayout::Warehouse,
            } => format!("{}{}/json", base_url, package_name),
            IndexEndpoint::MetadataDocument {
                base_url,
                layout: MetadataLayout::Devpi,
            } => format!("{}{}", base_url, package_name),
        }
    }
}

/// Where a package's versions are looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOrigin {
    pub endpoint: IndexEndpoint,
    /// Short name of the index for reports
    pub label: String,
}

/// A package whose versions cannot be enumerated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incomparable {
    pub reason: String,
}

impl Incomparable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Resolves locked packages to index endpoints
#[derive(Debug, Clone)]
pub struct OriginResolver {
    public_index_url: String,
}

impl Default for OriginResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_INDEX_URL)
    }
}

impl OriginResolver {
    /// Creates a resolver using `public_index_url` as the PyPI JSON API base
    pub fn new(public_index_url: &str) -> Self {
        Self {
            public_index_url: with_trailing_slash(public_index_url),
        }
    }

    pub fn resolve(&self, package: &LockedPackage) -> Result<ResolvedOrigin, Incomparable> {
        let Some(source) = &package.source else {
            return Ok(self.public_origin());
        };

        match source.kind {
            SourceKind::VersionControl | SourceKind::Direct => {
                Err(Incomparable::new(COMPARE_FAILED_REASON))
            }
            SourceKind::Registry => self.resolve_registry(&source.url),
        }
    }

    fn resolve_registry(&self, source_url: &str) -> Result<ResolvedOrigin, Incomparable> {
        let url = Url::parse(source_url.trim())
            .map_err(|e| Incomparable::new(format!("Invalid source URL: {}", e)))?;

        let Some(host) = url.host_str().map(str::to_string) else {
            return Err(Incomparable::new(format!(
                "Invalid source URL: {} has no host",
                source_url
            )));
        };

        if is_public_registry(&url) {
            return Ok(self.public_origin());
        }

        let endpoint = if url.path().contains(DEVPI_SIMPLE_MARKER) {
            IndexEndpoint::MetadataDocument {
                base_url: normalize_index_url(url.as_str()),
                layout: MetadataLayout::Devpi,
            }
        } else {
            IndexEndpoint::SimpleIndexPage {
                base_url: with_trailing_slash(url.as_str()),
            }
        };

        Ok(ResolvedOrigin {
            endpoint,
            label: host,
        })
    }

    fn public_origin(&self) -> ResolvedOrigin {
        ResolvedOrigin {
            endpoint: IndexEndpoint::MetadataDocument {
                base_url: self.public_index_url.clone(),
                layout: MetadataLayout::Warehouse,
            },
            label: PUBLIC_LABEL.to_string(),
        }
    }
}

fn is_public_registry(url: &Url) -> bool {
    let host_is_public = url
        .host_str()
        .is_some_and(|host| PUBLIC_HOSTS.contains(&host));
    let path = with_trailing_slash(url.path());

    host_is_public || path.contains(DEVPI_PUBLIC_MIRROR_PATH)
}

/// Strip the devpi `+simple` marker and keep exactly one trailing slash
fn normalize_index_url(url: &str) -> String {
    with_trailing_slash(&url.replace(DEVPI_SIMPLE_MARKER, ""))
}

fn with_trailing_slash(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}
