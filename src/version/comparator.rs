//! Latest-version selection under PEP 440 or semver ordering
//!
//! Pre-release policy: a package pinned to a pre-release (or dev build) is
//! compared against every published version; a package pinned to a final
//! release is only compared against final releases.

use std::cmp::Ordering;
use std::str::FromStr;

use clap::ValueEnum;
use pep508_rs::pep440_rs::Version as Pep440Version;
use tracing::debug;

use crate::version::error::ComparatorError;
use crate::version::semver::{is_prerelease, parse_version};

/// Versioning scheme used to order published versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum VersionScheme {
    /// PEP 440 (Python packaging)
    #[default]
    Pep440,
    /// Semantic Versioning 2.0
    Semver,
}

impl VersionScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionScheme::Pep440 => "pep440",
            VersionScheme::Semver => "semver",
        }
    }
}

/// A version value with a total order and a notion of pre-release
trait SchemeVersion: Ord + Sized {
    fn parse(raw: &str) -> Option<Self>;
    fn is_prerelease(&self) -> bool;
}

impl SchemeVersion for Pep440Version {
    fn parse(raw: &str) -> Option<Self> {
        Pep440Version::from_str(raw.trim()).ok()
    }

    fn is_prerelease(&self) -> bool {
        self.is_pre() || self.is_dev()
    }
}

impl SchemeVersion for semver::Version {
    fn parse(raw: &str) -> Option<Self> {
        parse_version(raw)
    }

    fn is_prerelease(&self) -> bool {
        is_prerelease(self)
    }
}

/// Select the latest version among `candidates` for a package pinned at `current`.
///
/// Returns the winning candidate exactly as published. Unparseable candidates
/// are skipped; if none parses, `NoValidVersions` is returned. When the current
/// version is a final release and only pre-releases were published, the
/// current version is returned.
pub fn latest_version<I, S>(
    scheme: VersionScheme,
    current: &str,
    candidates: I,
) -> Result<String, ComparatorError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match scheme {
        VersionScheme::Pep440 => select_latest::<Pep440Version, _, _>(current, candidates),
        VersionScheme::Semver => select_latest::<semver::Version, _, _>(current, candidates),
    }
}

/// Whether two version strings denote the same version under `scheme`.
///
/// Falls back to string equality when either side does not parse.
pub fn same_version(scheme: VersionScheme, a: &str, b: &str) -> bool {
    let ordering = match scheme {
        VersionScheme::Pep440 => compare::<Pep440Version>(a, b),
        VersionScheme::Semver => compare::<semver::Version>(a, b),
    };

    match ordering {
        Some(ordering) => ordering == Ordering::Equal,
        None => a.trim() == b.trim(),
    }
}

fn compare<V: SchemeVersion>(a: &str, b: &str) -> Option<Ordering> {
    Some(V::parse(a)?.cmp(&V::parse(b)?))
}

fn select_latest<V, I, S>(current: &str, candidates: I) -> Result<String, ComparatorError>
where
    V: SchemeVersion,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let current_version = V::parse(current)
        .ok_or_else(|| ComparatorError::InvalidCurrentVersion(current.to_string()))?;

    let parsed: Vec<(V, S)> = candidates
        .into_iter()
        .filter_map(|raw| match V::parse(raw.as_ref()) {
            Some(version) => Some((version, raw)),
            None => {
                debug!("Skipping unparseable version '{}'", raw.as_ref());
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        return Err(ComparatorError::NoValidVersions);
    }

    let include_prereleases = current_version.is_prerelease();

    let latest = parsed
        .into_iter()
        .filter(|(version, _)| include_prereleases || !version.is_prerelease())
        .max_by(|(a, _), (b, _)| a.cmp(b));

    Ok(match latest {
        Some((_, raw)) => raw.as_ref().to_string(),
        None => current.to_string(),
    })
}
