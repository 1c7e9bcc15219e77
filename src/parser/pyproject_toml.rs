//! pyproject.toml reader for direct dependency names
//!
//! Collects names from the following tables:
//! - `[tool.poetry.dependencies]` and `[tool.poetry.dev-dependencies]`
//! - `[tool.poetry.group.<name>.dependencies]`
//! - `[project].dependencies` and `[project.optional-dependencies]` (PEP 508 strings)
//!
//! A manifest that declares none of them yields `None`, which leaves every
//! package unclassified.

use std::path::Path;
use std::str::FromStr;

use pep508_rs::{Requirement, VerbatimUrl};
use toml::{Table, Value};
use tracing::{debug, warn};

use crate::parser::error::ParseError;
use crate::parser::types::DirectDependencies;

/// Parse manifest content into the set of direct dependency names
pub fn parse_direct_dependencies(content: &str) -> Result<Option<DirectDependencies>, ParseError> {
    let document: Table = toml::from_str(content)?;

    let mut names = Vec::new();
    let mut found_table = false;

    if let Some(poetry) = document
        .get("tool")
        .and_then(|tool| tool.get("poetry"))
        .and_then(Value::as_table)
    {
        for key in ["dependencies", "dev-dependencies"] {
            if let Some(table) = poetry.get(key).and_then(Value::as_table) {
                found_table = true;
                names.extend(table.keys().cloned());
            }
        }

        if let Some(groups) = poetry.get("group").and_then(Value::as_table) {
            for (group_name, group) in groups {
                if let Some(table) = group.get("dependencies").and_then(Value::as_table) {
                    debug!("Reading dependency group '{}'", group_name);
                    found_table = true;
                    names.extend(table.keys().cloned());
                }
            }
        }
    }

    if let Some(project) = document.get("project").and_then(Value::as_table) {
        if let Some(dependencies) = project.get("dependencies").and_then(Value::as_array) {
            found_table = true;
            names.extend(requirement_names(dependencies));
        }

        if let Some(optional) = project
            .get("optional-dependencies")
            .and_then(Value::as_table)
        {
            found_table = true;
            for dependencies in optional.values().filter_map(Value::as_array) {
                names.extend(requirement_names(dependencies));
            }
        }
    }

    if !found_table {
        return Ok(None);
    }

    Ok(Some(DirectDependencies::from_names(names)))
}

/// Read and parse the manifest at `path`
pub fn load_direct_dependencies(path: &Path) -> Result<Option<DirectDependencies>, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_direct_dependencies(&content)
}

/// Extract project names from an array of PEP 508 requirement strings
fn requirement_names(dependencies: &[Value]) -> Vec<String> {
    dependencies
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|dep| {
            Requirement::<VerbatimUrl>::from_str(dep)
                .inspect_err(|e| warn!("Failed to parse dependency '{}': {}", dep, e))
                .ok()
        })
        .map(|req| req.name.to_string())
        .collect()
}
