use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;

use super::error::StorageError;
use super::hash::ContentHash;
use super::key::FileKey;
use super::traits::{BoxReader, FileStore, StoredFile};

/// Filesystem-backed file store.
///
/// Files are laid out as `{root}/{namespace}/{2 hex chars}/{62 hex chars}.{ext}`.
/// Writes go to `{root}/.tmp` first and are renamed into place.
pub struct FilesystemFileStore {
    root: PathBuf,
    max_size: u64,
}

impl FilesystemFileStore {
    pub async fn new(root: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self { root, max_size })
    }

    fn file_path(&self, key: &FileKey) -> PathBuf {
        self.root.join(key.relative_path())
    }

    fn temp_path(&self) -> PathBuf {
        self.root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl FileStore for FilesystemFileStore {
    async fn save(
        &self,
        namespace: &str,
        extension: &str,
        data: &[u8],
    ) -> Result<StoredFile, StorageError> {
        let size = data.len() as u64;
        if size > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: size,
                limit: self.max_size,
            });
        }

        let hash = ContentHash::compute(data);
        let key = FileKey::for_content(namespace, extension, &hash)?;
        let path = self.file_path(&key);

        if fs::try_exists(&path).await? {
            return Ok(StoredFile { key, size });
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(key = %key, size, "Stored file");
        Ok(StoredFile { key, size })
    }

    async fn open(&self, key: &FileKey) -> Result<BoxReader, StorageError> {
        match fs::File::open(self.file_path(key)).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &FileKey) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.file_path(key)).await?)
    }

    async fn delete(&self, key: &FileKey) -> Result<bool, StorageError> {
        match fs::remove_file(self.file_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
