use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::key::FileKey;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Result of a successful [`FileStore::save`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredFile {
    pub key: FileKey,
    pub size: u64,
}

/// Backend that keeps uploaded files (resumes, logos).
///
/// Files are content-addressed inside a namespace, so saving the same bytes twice
/// yields the same key.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `data` under `namespace` with the given file extension.
    async fn save(
        &self,
        namespace: &str,
        extension: &str,
        data: &[u8],
    ) -> Result<StoredFile, StorageError>;

    /// Open a stored file for streaming.
    async fn open(&self, key: &FileKey) -> Result<BoxReader, StorageError>;

    /// Read a stored file fully into memory.
    async fn load(&self, key: &FileKey) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.open(key).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    async fn exists(&self, key: &FileKey) -> Result<bool, StorageError>;

    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(&self, key: &FileKey) -> Result<bool, StorageError>;
}
