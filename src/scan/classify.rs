//! Direct/transitive classification of locked packages

use crate::parser::types::DirectDependencies;

/// How a locked package relates to the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DependencyClassification {
    /// Declared in the manifest
    Direct,
    /// Pulled in by another dependency
    Transitive,
    /// No manifest was supplied
    Unknown,
}

impl DependencyClassification {
    /// Label shown in reports
    pub fn label(&self) -> &'static str {
        match self {
            DependencyClassification::Direct => "direct",
            DependencyClassification::Transitive => "trans.",
            DependencyClassification::Unknown => "",
        }
    }
}

pub fn classify(
    package_name: &str,
    direct_dependencies: Option<&DirectDependencies>,
) -> DependencyClassification {
    match direct_dependencies {
        None => DependencyClassification::Unknown,
        Some(direct) if direct.contains(package_name) => DependencyClassification::Direct,
        Some(_) => DependencyClassification::Transitive,
    }
}
