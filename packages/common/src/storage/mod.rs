mod error;
mod hash;
mod key;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use hash::ContentHash;
pub use key::FileKey;
pub use traits::{BoxReader, FileStore, StoredFile};
