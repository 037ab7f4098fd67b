use std::fmt;
use std::path::PathBuf;

use super::error::StorageError;
use super::hash::ContentHash;

/// Relative location of a stored file: `{namespace}/{shard}/{rest}.{extension}`.
///
/// Keys are what the database stores and what clients see in download URLs,
/// so parsing is strict: every segment is checked against a fixed alphabet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileKey {
    namespace: String,
    shard: String,
    name: String,
    extension: String,
}

fn is_namespace(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}

fn is_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

fn is_extension(s: &str) -> bool {
    !s.is_empty() && s.len() <= 8 && s.chars().all(|c| c.is_ascii_alphanumeric())
}

impl FileKey {
    /// Build the key for content in `namespace` with the given extension.
    pub fn for_content(
        namespace: &str,
        extension: &str,
        hash: &ContentHash,
    ) -> Result<Self, StorageError> {
        let extension = extension.to_ascii_lowercase();
        if !is_namespace(namespace) {
            return Err(StorageError::InvalidKey(format!(
                "invalid namespace '{namespace}'"
            )));
        }
        if !is_extension(&extension) {
            return Err(StorageError::InvalidKey(format!(
                "invalid extension '{extension}'"
            )));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            shard: hash.shard_prefix(),
            name: hash.shard_suffix(),
            extension,
        })
    }

    /// Parse a key previously produced by [`FileKey::for_content`].
    pub fn parse(key: &str) -> Result<Self, StorageError> {
        let invalid = || StorageError::InvalidKey(key.to_string());

        let mut parts = key.split('/');
        let (Some(namespace), Some(shard), Some(file), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let (name, extension) = file.rsplit_once('.').ok_or_else(invalid)?;

        if !is_namespace(namespace)
            || !is_hex(shard, 2)
            || !is_hex(name, 62)
            || !is_extension(extension)
        {
            return Err(invalid());
        }

        Ok(Self {
            namespace: namespace.to_string(),
            shard: shard.to_string(),
            name: name.to_string(),
            extension: extension.to_string(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Path of the file relative to a storage root.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.namespace)
            .join(&self.shard)
            .join(format!("{}.{}", self.name, self.extension))
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}.{}",
            self.namespace, self.shard, self.name, self.extension
        )
    }
}
