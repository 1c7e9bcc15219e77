//! Concurrent scan of every locked package

use std::sync::Arc;

use futures::future::join_all;
use reqwest::Url;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::config::ScanConfig;
use crate::parser::types::{DirectDependencies, LockedPackage};
use crate::scan::classify::{DependencyClassification, classify};
use crate::scan::outcome::{ScanEntry, ScanOutcome, ScanReport};
use crate::version::comparator::{VersionScheme, latest_version, same_version};
use crate::version::error::{ClientError, ErrorKind};
use crate::version::origin::OriginResolver;
use crate::version::registry::IndexClient;

const PROJECT_NOT_FOUND_REASON: &str = "Couldn't find project.";

/// Checks locked packages against their indexes
pub struct Scanner {
    client: Arc<dyn IndexClient>,
    resolver: Arc<OriginResolver>,
    scheme: VersionScheme,
    max_concurrency: usize,
}

impl Scanner {
    pub fn new(client: Arc<dyn IndexClient>, config: &ScanConfig) -> Self {
        Self {
            client,
            resolver: Arc::new(OriginResolver::new(&config.public_index_url)),
            scheme: config.version_scheme,
            max_concurrency: config.max_concurrency.max(1),
        }
    }

    /// Scan and keep only the entries worth reporting
    pub async fn scan(
        &self,
        packages: Vec<LockedPackage>,
        direct_dependencies: Option<&DirectDependencies>,
    ) -> ScanReport {
        ScanReport::from_entries(self.scan_all(packages, direct_dependencies).await)
    }

    /// Check every package and return one entry per package.
    ///
    /// Packages are checked in parallel, at most `max_concurrency` at a time.
    /// A failing or panicking check only affects its own entry. Entries are
    /// sorted by classification then name; packages that compare equal keep
    /// their lock-file order.
    pub async fn scan_all(
        &self,
        packages: Vec<LockedPackage>,
        direct_dependencies: Option<&DirectDependencies>,
    ) -> Vec<ScanEntry> {
        info!(
            "Scanning {} packages with up to {} workers ({} ordering)",
            packages.len(),
            self.max_concurrency,
            self.scheme.as_str()
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));

        let tasks: Vec<_> = packages
            .into_iter()
            .map(|package| {
                let classification = classify(&package.name, direct_dependencies);
                let semaphore = semaphore.clone();
                let client = self.client.clone();
                let resolver = self.resolver.clone();
                let scheme = self.scheme;
                let task_package = package.clone();

                let handle = tokio::spawn(async move {
                    let Ok(_permit) = semaphore.acquire().await else {
                        return errored_entry(
                            task_package,
                            classification,
                            "worker pool closed".to_string(),
                        );
                    };
                    check_package(task_package, classification, &resolver, client.as_ref(), scheme)
                        .await
                });

                (package, classification, handle)
            })
            .collect();

        let (meta, handles): (Vec<_>, Vec<_>) = tasks
            .into_iter()
            .map(|(package, classification, handle)| ((package, classification), handle))
            .unzip();

        let mut entries: Vec<ScanEntry> = join_all(handles)
            .await
            .into_iter()
            .zip(meta)
            .map(|(result, (package, classification))| match result {
                Ok(entry) => entry,
                Err(e) => {
                    error!("Check for {} did not finish: {}", package.name, e);
                    errored_entry(package, classification, e.to_string())
                }
            })
            .collect();

        entries.sort_by_cached_key(|entry| {
            (entry.classification, entry.package.name.to_lowercase())
        });

        entries
    }
}

fn errored_entry(
    package: LockedPackage,
    classification: DependencyClassification,
    message: String,
) -> ScanEntry {
    ScanEntry {
        package,
        classification,
        origin_label: None,
        outcome: ScanOutcome::Errored {
            kind: ErrorKind::TaskFailed,
            message,
        },
    }
}

/// Resolve, fetch and compare a single package
async fn check_package(
    package: LockedPackage,
    classification: DependencyClassification,
    resolver: &OriginResolver,
    client: &dyn IndexClient,
    scheme: VersionScheme,
) -> ScanEntry {
    let origin = match resolver.resolve(&package) {
        Ok(origin) => origin,
        Err(incomparable) => {
            debug!(
                "Skipping {} ({} source): {}",
                package.name,
                package.source.as_ref().map_or("registry", |s| s.kind.as_str()),
                incomparable.reason
            );
            let origin_label = source_host(&package);
            return ScanEntry {
                package,
                classification,
                origin_label,
                outcome: ScanOutcome::Incomparable {
                    reason: incomparable.reason,
                },
            };
        }
    };

    let outcome = match client.fetch_versions(&origin.endpoint, &package.name).await {
        Ok(versions) => compare(scheme, &package.version, &versions, &origin.label),
        Err(ClientError::NotFound(_)) => {
            info!("Package not found on {}: {}", origin.label, package.name);
            ScanOutcome::Incomparable {
                reason: PROJECT_NOT_FOUND_REASON.to_string(),
            }
        }
        Err(e) => {
            warn!(
                "Failed to fetch versions for {} from {}: {}",
                package.name, origin.label, e
            );
            ScanOutcome::Errored {
                kind: e.kind(),
                message: e.to_string(),
            }
        }
    };

    ScanEntry {
        package,
        classification,
        origin_label: Some(origin.label),
        outcome,
    }
}

/// Host of the package's source URL, for packages that never reach an index
fn source_host(package: &LockedPackage) -> Option<String> {
    let source = package.source.as_ref()?;
    let url = Url::parse(source.url.trim()).ok()?;
    url.host_str().map(str::to_string)
}

fn compare<'a>(
    scheme: VersionScheme,
    current: &str,
    versions: impl IntoIterator<Item = &'a String>,
    origin_label: &str,
) -> ScanOutcome {
    match latest_version(scheme, current, versions) {
        Ok(latest) if same_version(scheme, current, &latest) => ScanOutcome::UpToDate,
        Ok(latest) => ScanOutcome::Outdated {
            current_version: current.to_string(),
            latest_version: latest,
            origin_label: origin_label.to_string(),
        },
        Err(e) => {
            warn!("Failed to compare versions against {}: {}", current, e);
            ScanOutcome::Errored {
                kind: e.kind(),
                message: e.to_string(),
            }
        }
    }
}
