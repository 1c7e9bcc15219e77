//! Simple repository API project pages (PEP 503 HTML, PEP 691 JSON)
//!
//! Versions are read from the PEP 700 `versions` list when the index provides
//! one, otherwise extracted from distribution file names.

use indexmap::IndexSet;
use regex::Regex;
use serde::Deserialize;

use crate::parser::types::normalize_package_name;
use crate::version::error::ClientError;

/// Media type of the JSON flavour of the simple API
pub const SIMPLE_JSON_CONTENT_TYPE: &str = "application/vnd.pypi.simple.v1+json";

/// Accept header preferring JSON project pages over HTML ones
pub const SIMPLE_ACCEPT: &str = "application/vnd.pypi.simple.v1+json, text/html;q=0.1";

const SDIST_EXTENSIONS: [&str; 6] = [".tar.gz", ".tar.bz2", ".tar.xz", ".tgz", ".zip", ".tar"];

#[derive(Debug, Deserialize)]
struct SimpleProject {
    #[serde(default)]
    versions: Vec<String>,
    #[serde(default)]
    files: Vec<SimpleFile>,
}

#[derive(Debug, Deserialize)]
struct SimpleFile {
    filename: String,
}

/// Parser for simple API project pages
pub struct SimplePageParser {
    /// Regex for anchors: `<a href="...">requests-2.31.0.tar.gz</a>`
    anchor_re: Regex,
}

impl SimplePageParser {
    pub fn new() -> Self {
        Self {
            anchor_re: Regex::new(r"(?is)<a\s[^>]*>(.*?)</a\s*>").unwrap(),
        }
    }

    /// Extract the published versions of `project` from a project page body
    pub fn parse(
        &self,
        project: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> Result<IndexSet<String>, ClientError> {
        let is_json = content_type.is_some_and(|ct| ct.contains("json"));

        let versions = if is_json {
            self.parse_json(project, body)?
        } else {
            self.parse_html(project, body)?
        };

        if versions.is_empty() {
            return Err(ClientError::NotFound(project.to_string()));
        }

        Ok(versions)
    }

    fn parse_json(&self, project: &str, body: &str) -> Result<IndexSet<String>, ClientError> {
        let page: SimpleProject = serde_json::from_str(body)
            .map_err(|e| ClientError::UnsupportedFormat(e.to_string()))?;

        if !page.versions.is_empty() {
            return Ok(page.versions.into_iter().collect());
        }

        Ok(page
            .files
            .iter()
            .filter_map(|file| version_from_filename(project, &file.filename))
            .collect())
    }

    fn parse_html(&self, project: &str, body: &str) -> Result<IndexSet<String>, ClientError> {
        let lowered = body.to_ascii_lowercase();
        if !lowered.contains("<html") && !lowered.contains("<a ") {
            return Err(ClientError::UnsupportedFormat(
                "expected an HTML project page".to_string(),
            ));
        }

        Ok(self
            .anchor_re
            .captures_iter(body)
            .filter_map(|caps| caps.get(1))
            .filter_map(|text| version_from_filename(project, text.as_str()))
            .collect())
    }
}

impl Default for SimplePageParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the version from a distribution file name.
///
/// Wheels and eggs carry the version as the second dash-separated component.
/// Source distributions are `{name}-{version}{ext}`, where the name may
/// itself contain dashes, so the prefix is matched against the project name.
pub fn version_from_filename(project: &str, filename: &str) -> Option<String> {
    let filename = filename.trim();

    if let Some(stem) = filename
        .strip_suffix(".whl")
        .or_else(|| filename.strip_suffix(".egg"))
    {
        return stem
            .split('-')
            .nth(1)
            .filter(|version| !version.is_empty())
            .map(str::to_string);
    }

    let stem = SDIST_EXTENSIONS
        .iter()
        .find_map(|ext| filename.strip_suffix(ext))?;
    let project = normalize_package_name(project);

    stem.match_indices('-')
        .find_map(|(pos, _)| {
            (normalize_package_name(&stem[..pos]) == project).then(|| &stem[pos + 1..])
        })
        .filter(|version| !version.is_empty())
        .map(str::to_string)
}
