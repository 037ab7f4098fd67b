use thiserror::Error;

/// Errors that can occur while storing or reading uploaded files.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No file is stored under the requested key.
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The key is malformed or tries to escape the storage root.
    #[error("invalid file key: {0}")]
    InvalidKey(String),
    /// The file exceeds the configured size limit.
    #[error("file exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
