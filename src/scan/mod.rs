//! Scan layer
//!
//! - [`classify`]: Direct/transitive classification against the manifest
//! - [`outcome`]: Per-package outcomes and the aggregated report
//! - [`orchestrator`]: Bounded fan-out over all locked packages

pub mod classify;
pub mod orchestrator;
pub mod outcome;

pub use classify::{DependencyClassification, classify};
pub use orchestrator::Scanner;
pub use outcome::{ScanEntry, ScanOutcome, ScanReport};
