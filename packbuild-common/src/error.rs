use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PackbuildError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("HTTP Request Error: {0}")]
    Http(#[from] Arc<reqwest::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Manifest Error: {0}")]
    Manifest(String),

    #[error("API Error: {0}")]
    Api(String),

    #[error("DownloadError: Failed to download '{0}' from '{1}': {2}")]
    DownloadError(String, String, String),

    #[error("Cache Error: {0}")]
    Cache(String),

    #[error("Resource Not Found: {0}")]
    NotFound(String),

    #[error("HttpError: {0}")]
    HttpError(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("Source Unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Checksum Mismatch: {0}")]
    ChecksumMismatch(String),

    #[error("Incompatible Version: {0}")]
    IncompatibleVersion(String),

    #[error("Ambiguous Identity: {0}")]
    AmbiguousIdentity(String),

    #[error("Corrupt Index State: {0}")]
    CorruptIndexState(String),

    #[error("Dataset Unresolvable: {0}")]
    DatasetUnresolvable(String),

    #[error("Git Error: {0}")]
    Git(String),

    #[error("Generic Error: {0}")]
    Generic(String),
}

impl From<std::io::Error> for PackbuildError {
    fn from(err: std::io::Error) -> Self {
        PackbuildError::Io(Arc::new(err))
    }
}

impl From<reqwest::Error> for PackbuildError {
    fn from(err: reqwest::Error) -> Self {
        PackbuildError::Http(Arc::new(err))
    }
}

impl From<serde_json::Error> for PackbuildError {
    fn from(err: serde_json::Error) -> Self {
        PackbuildError::Json(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, PackbuildError>;
