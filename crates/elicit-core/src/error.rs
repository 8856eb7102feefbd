use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ElicitError {
    #[error("domain not found: {0}")]
    DomainNotFound(String),

    #[error("domain already registered: {0}")]
    DomainExists(String),

    #[error("invalid domain '{id}': {reason}")]
    InvalidDomain { id: String, reason: String },

    #[error("no record set loaded: call load() before {0}")]
    NotLoaded(&'static str),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("invalid document '{path}': expected a JSON array of records")]
    InvalidDocument { path: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ElicitError>;
