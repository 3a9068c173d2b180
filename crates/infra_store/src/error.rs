//! Persistence error types
//!
//! Adapter failures are described here with the file involved, then
//! translated to [`PortError`] at the port boundary.

use std::path::PathBuf;

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur while reading or writing stored snapshots
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading, writing or renaming a file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored document is not a valid billing snapshot
    #[error("Malformed snapshot in {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot could not be encoded
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Malformed {
            path: path.into(),
            source,
        }
    }
}

impl From<StoreError> for PortError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Io { path, source } => {
                PortError::io(format!("{}", path.display()), source)
            }
            StoreError::Malformed { .. } | StoreError::Encode(_) => {
                PortError::transformation(error.to_string())
            }
        }
    }
}
