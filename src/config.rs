use std::num::NonZeroUsize;
use std::time::Duration;

use clap::Args;

use crate::version::comparator::VersionScheme;

// =============================================================================
// Index-related constants
// =============================================================================

/// Base URL of the public registry's JSON API
pub const DEFAULT_PUBLIC_INDEX_URL: &str = "https://pypi.org/pypi/";

/// Timeout for a single index request in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// User agent sent with every index and GitLab request
pub const USER_AGENT: &str = concat!("deps-scanner/", env!("CARGO_PKG_VERSION"));

/// Printed instead of a report when no package needs attention
pub const UP_TO_DATE_MESSAGE: &str = "Everything up to date.";

/// Fallback worker count when the host parallelism cannot be queried
const FALLBACK_CONCURRENCY: usize = 4;

/// Settings for a single scan run
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Maximum number of packages checked at the same time
    pub max_concurrency: usize,
    /// Per-request timeout for index lookups
    pub fetch_timeout: Duration,
    /// Version ordering used to pick the latest release
    pub version_scheme: VersionScheme,
    /// Base URL used for packages without a source and for public mirrors
    pub public_index_url: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_concurrency(),
            fetch_timeout: Duration::from_millis(FETCH_TIMEOUT_MS),
            version_scheme: VersionScheme::default(),
            public_index_url: DEFAULT_PUBLIC_INDEX_URL.to_string(),
        }
    }
}

/// Returns the number of workers to use when none is configured.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(FALLBACK_CONCURRENCY)
}

/// Settings for posting the report on a GitLab merge request
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct GitLabConfig {
    /// Username of the bot account whose note is updated in place
    #[arg(long, env = "BOT_USERNAME")]
    pub bot_username: String,

    /// Access token of the bot account
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    /// Base URL of the GitLab instance
    #[arg(long, env = "CI_SERVER_URL")]
    pub server_url: String,

    /// Numeric id or full path of the project
    #[arg(long, env = "CI_PROJECT_ID")]
    pub project_id: String,

    /// Internal id of the merge request within the project
    #[arg(long, env = "CI_MERGE_REQUEST_IID")]
    pub merge_request_iid: u64,
}
