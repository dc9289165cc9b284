//! Error types for documentation generation

use thiserror::Error;

use crate::resolver::ResolutionFailure;

/// Result type for documentation operations
pub type Result<T> = std::result::Result<T, DocsError>;

/// Documentation generator errors
#[derive(Error, Debug)]
pub enum DocsError {
    #[error("Failed to resolve $ref '{reference}' at {path}: {source}")]
    Reference {
        path: String,
        reference: String,
        #[source]
        source: ResolutionFailure,
    },

    #[error("Entry document not found in schema set: {0}")]
    EntryNotFound(String),

    #[error("Invalid schema JSON in {path}: {source}")]
    InvalidSchema {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl DocsError {
    pub(crate) fn reference(path: impl ToString, reference: &str, source: ResolutionFailure) -> Self {
        Self::Reference {
            path: path.to_string(),
            reference: reference.to_string(),
            source,
        }
    }
}
