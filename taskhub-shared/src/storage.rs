/// Blob store contract and disk implementation
///
/// The Attachment Store records metadata only; the bytes themselves go
/// through this seam. The contract is deliberately minimal (store bytes,
/// get an opaque locator back, retrieve bytes by locator) so the backing
/// implementation is swappable.
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::storage::{BlobStore, DiskStore};
/// use bytes::Bytes;
///
/// # async fn example() -> Result<(), taskhub_shared::storage::StorageError> {
/// let store = DiskStore::new("uploads");
/// store.ensure_root().await?;
///
/// let locator = store.store(Bytes::from("report body"), "report.pdf").await?;
/// let bytes = store.retrieve(&locator).await?;
/// assert_eq!(&bytes[..], b"report body");
/// # Ok(())
/// # }
/// ```
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

/// Error type for blob store operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No blob exists for the locator
    #[error("blob not found: {0}")]
    NotFound(String),

    /// The locator is not one this store issued
    #[error("invalid blob locator: {0}")]
    InvalidLocator(String),

    /// Underlying I/O failure
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Contract the Attachment Store consumes
///
/// `store` returns an opaque locator; `retrieve` resolves it back to bytes.
/// Locators are stable for the lifetime of the blob.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persists `bytes`, returning the locator to fetch them again
    async fn store(&self, bytes: Bytes, filename: &str) -> Result<String, StorageError>;

    /// Fetches the blob behind a locator
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when no blob exists for the locator.
    async fn retrieve(&self, locator: &str) -> Result<Bytes, StorageError>;
}

/// Disk-backed blob store
///
/// Blobs are written under a single root directory with collision-free
/// names: a random UUID prefix followed by the sanitized original filename.
/// The locator is that file name, relative to the root.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Creates a store rooted at `root` (not created until
    /// [`DiskStore::ensure_root`])
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the root directory if it does not exist yet
    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    // Locators are single path components issued by `store`; anything with
    // separators or parent references never came from us.
    fn resolve(&self, locator: &str) -> Result<PathBuf, StorageError> {
        if locator.is_empty()
            || locator.contains('/')
            || locator.contains('\\')
            || locator.contains("..")
        {
            return Err(StorageError::InvalidLocator(locator.to_string()));
        }
        Ok(self.root.join(locator))
    }
}

// Keep only the final path component of whatever filename the client sent.
fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        "unnamed".to_string()
    } else {
        base.to_string()
    }
}

#[async_trait]
impl BlobStore for DiskStore {
    async fn store(&self, bytes: Bytes, filename: &str) -> Result<String, StorageError> {
        let locator = format!("{}-{}", Uuid::new_v4(), sanitize_filename(filename));
        let path = self.resolve(&locator)?;

        tokio::fs::write(&path, &bytes).await?;
        debug!(locator = %locator, size = bytes.len(), "Stored blob");

        Ok(locator)
    }

    async fn retrieve(&self, locator: &str) -> Result<Bytes, StorageError> {
        let path = self.resolve(locator)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(locator.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> DiskStore {
        DiskStore::new(std::env::temp_dir().join(format!("taskhub-blobs-{}", Uuid::new_v4())))
    }

    #[tokio::test]
    async fn test_store_and_retrieve_round_trip() {
        let store = temp_store();
        store.ensure_root().await.unwrap();

        let locator = store
            .store(Bytes::from("report body"), "report.pdf")
            .await
            .unwrap();
        assert!(locator.ends_with("report.pdf"));

        let bytes = store.retrieve(&locator).await.unwrap();
        assert_eq!(&bytes[..], b"report body");
    }

    #[tokio::test]
    async fn test_retrieve_missing_is_not_found() {
        let store = temp_store();
        store.ensure_root().await.unwrap();

        let result = store.retrieve("no-such-blob.bin").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_locators_are_collision_free() {
        let store = temp_store();
        store.ensure_root().await.unwrap();

        let a = store.store(Bytes::from("a"), "same.txt").await.unwrap();
        let b = store.store(Bytes::from("b"), "same.txt").await.unwrap();
        assert_ne!(a, b);

        assert_eq!(&store.retrieve(&a).await.unwrap()[..], b"a");
        assert_eq!(&store.retrieve(&b).await.unwrap()[..], b"b");
    }

    #[tokio::test]
    async fn test_traversal_locators_rejected() {
        let store = temp_store();

        let result = store.retrieve("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidLocator(_))));
    }

    #[test]
    fn test_sanitize_filename_strips_paths() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("/tmp/evil/report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("..\\..\\report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename(""), "unnamed");
        assert_eq!(sanitize_filename(".."), "unnamed");
    }
}
