use async_trait::async_trait;

use super::error::StorageError;

/// Gateway to an external object store for binary assets.
///
/// Implementations hold their configuration (bucket, region, credentials)
/// from construction and keep no per-call state. Backend/transport failures
/// are converted into [`StorageError`] at this boundary; callers decide
/// whether a failure is fatal to the enclosing workflow.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under the logical path `key` and return the stable,
    /// publicly resolvable URL of the stored object.
    ///
    /// Re-uploading to an existing key replaces the previous object.
    async fn put(
        &self,
        key: &str,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<String, StorageError>;

    /// Best-effort removal of the object stored under `key`.
    ///
    /// Returns `true` if the backend confirmed the delete. Failures are
    /// logged by the gateway and reported as `false`, never raised.
    async fn delete(&self, key: &str) -> bool;

    /// The public URL an object stored under `key` resolves to.
    ///
    /// Deterministic; does not touch the backend.
    fn public_url(&self, key: &str) -> String;
}

/// Reject keys that are empty, absolute, traversing, or oversized.
///
/// The resulting URL must fit the 2048-character column that stores it.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.trim().is_empty() {
        return Err(StorageError::InvalidKey("key cannot be empty".into()));
    }
    if key.len() > 1024 {
        return Err(StorageError::InvalidKey(
            "key exceeds maximum length of 1024 characters".into(),
        ));
    }
    if key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "key must not start with '/'".into(),
        ));
    }
    if key == ".."
        || key.starts_with("../")
        || key.contains("/../")
        || key.ends_with("/..")
    {
        return Err(StorageError::InvalidKey(
            "key must not contain '..' traversal".into(),
        ));
    }
    if key.contains('\0') {
        return Err(StorageError::InvalidKey(
            "key must not contain null bytes".into(),
        ));
    }
    Ok(())
}
