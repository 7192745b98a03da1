use std::path::PathBuf;

/// Errors that can occur while reading or writing rolling codes.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The record could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The lock guarding a record could not be taken.
    #[error("failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The record exists but does not hold a non-negative integer.
    #[error("unparsable rolling code {content:?}")]
    Corrupt { content: String },

    /// The backing storage refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
