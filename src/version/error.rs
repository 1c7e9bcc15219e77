use thiserror::Error;

/// Closed set of failure kinds a scan entry can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Index answered with a non-success status
    Http,
    /// Index answered with a body in an unexpected shape
    UnsupportedFormat,
    /// Index did not answer in time
    Timeout,
    /// Connection-level failure
    Network,
    /// None of the published versions could be parsed
    NoValidVersions,
    /// The locked version itself could not be parsed
    InvalidVersion,
    /// The worker checking the package did not finish
    TaskFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Http => "http",
            ErrorKind::UnsupportedFormat => "unsupported-format",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Network => "network",
            ErrorKind::NoValidVersions => "no-valid-versions",
            ErrorKind::InvalidVersion => "invalid-version",
            ErrorKind::TaskFailed => "task-failed",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Index returned status {0}")]
    Http(u16),

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Unsupported response format: {0}")]
    UnsupportedFormat(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ClientError {
    /// Kind reported for this failure.
    ///
    /// `NotFound` never reaches a report as an error (the scanner turns it
    /// into an incomparable entry); it is reported as `Http` if it ever does.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Http(_) | ClientError::NotFound(_) => ErrorKind::Http,
            ClientError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            ClientError::Timeout(_) => ErrorKind::Timeout,
            ClientError::Network(_) => ErrorKind::Network,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout(e.to_string())
        } else if e.is_decode() {
            ClientError::UnsupportedFormat(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComparatorError {
    #[error("No valid versions found")]
    NoValidVersions,

    #[error("Invalid current version: {0}")]
    InvalidCurrentVersion(String),
}

impl ComparatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ComparatorError::NoValidVersions => ErrorKind::NoValidVersions,
            ComparatorError::InvalidCurrentVersion(_) => ErrorKind::InvalidVersion,
        }
    }
}
