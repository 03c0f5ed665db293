// ABOUTME: Error types for the mdpress application
// ABOUTME: Provides structured error handling for each stage of the sync pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0:?}")]
    PathNotFound(PathBuf),

    #[error("Failed to create directory {path:?}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid post filename {file:?}: {reason}")]
    DateParse { file: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Watch error: {0}")]
    Watch(String),

    #[error("Input validation error: {0}")]
    Validation(String),
}

impl PublishError {
    /// Wrap an I/O error together with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PublishError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<walkdir::Error> for PublishError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop"));
        PublishError::Io { path, source }
    }
}

impl From<serde_yaml::Error> for PublishError {
    fn from(err: serde_yaml::Error) -> Self {
        PublishError::Config(format!("Invalid YAML: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, PublishError>;
