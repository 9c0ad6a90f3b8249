//! Error types for transcheck

use thiserror::Error;

/// Result type alias using the transcheck error
pub type Result<T> = std::result::Result<T, Error>;

/// transcheck error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("Corpus integrity error in {source_name}: {reason}")]
    CorpusIntegrity { source_name: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported corpus format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    pub fn corpus(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::CorpusIntegrity {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}
