//! Per-package scan results

use crate::parser::types::LockedPackage;
use crate::scan::classify::DependencyClassification;
use crate::version::error::ErrorKind;

/// Result of checking one locked package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The locked version is the latest one
    UpToDate,
    /// A different version is the latest one
    Outdated {
        current_version: String,
        latest_version: String,
        origin_label: String,
    },
    /// The package cannot be compared against an index
    Incomparable { reason: String },
    /// Checking the package failed
    Errored { kind: ErrorKind, message: String },
}

impl ScanOutcome {
    /// Message shown in reports in place of the version pair
    pub fn message(&self) -> String {
        match self {
            ScanOutcome::UpToDate => String::new(),
            ScanOutcome::Outdated {
                current_version,
                latest_version,
                ..
            } => format!("current={} -> latest={}", current_version, latest_version),
            ScanOutcome::Incomparable { reason } => reason.clone(),
            ScanOutcome::Errored { kind, message } => format!("{}: {}", kind, message),
        }
    }
}

/// A locked package paired with its classification and outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub package: LockedPackage,
    pub classification: DependencyClassification,
    /// Label of the index the package was checked against, if resolved
    pub origin_label: Option<String>,
    pub outcome: ScanOutcome,
}

impl ScanEntry {
    pub fn needs_report(&self) -> bool {
        self.outcome != ScanOutcome::UpToDate
    }
}

/// Entries worth showing, or the fact that there are none
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanReport {
    NothingToReport,
    Findings(Vec<ScanEntry>),
}

impl ScanReport {
    /// Keeps every entry that is not up to date, in order
    pub fn from_entries(entries: Vec<ScanEntry>) -> Self {
        let findings: Vec<_> = entries.into_iter().filter(ScanEntry::needs_report).collect();

        if findings.is_empty() {
            ScanReport::NothingToReport
        } else {
            ScanReport::Findings(findings)
        }
    }
}
