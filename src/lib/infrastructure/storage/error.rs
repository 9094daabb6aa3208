use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid file name '{name}'")]
    InvalidName { name: String },
    #[error("'{name}' not found")]
    NotFound { name: String },
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode or decode {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub(super) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Map `NotFound` IO errors onto [`StorageError::NotFound`]
    pub(super) fn from_read(name: &str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                name: name.to_string(),
            }
        } else {
            Self::io(path, source)
        }
    }

    pub(super) fn invalid(name: &str) -> Self {
        Self::InvalidName {
            name: name.to_string(),
        }
    }
}
