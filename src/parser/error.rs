use std::path::PathBuf;

/// Error type for lock-file and manifest reading
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not have the expected structure
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}
