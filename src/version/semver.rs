use semver::Version;

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Handles partial versions like "1" or "1.2" by padding with zeros.
/// A leading 'v' is stripped.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "v1.2.3-rc.1" -> Version(1, 2, 3, pre: rc.1)
pub fn parse_version(version: &str) -> Option<Version> {
    let version = version.trim();
    let version = version.strip_prefix('v').unwrap_or(version);

    // Only the release part is padded; "1.2-rc1" becomes "1.2.0-rc1"
    let (release, suffix) = match version.find(['-', '+']) {
        Some(pos) => version.split_at(pos),
        None => (version, ""),
    };

    let parts: Vec<&str> = release.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0{}", parts[0], suffix),
        2 => format!("{}.{}.0{}", parts[0], parts[1], suffix),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// Whether the version carries a pre-release component
pub fn is_prerelease(version: &Version) -> bool {
    !version.pre.is_empty()
}
