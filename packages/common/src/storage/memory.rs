use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::error::StorageError;
use super::traits::{ObjectStorage, validate_key};

/// In-memory object store for tests and local development.
///
/// Produces the same URL shape as the real backend so that stored
/// references round-trip through the application unchanged.
pub struct MemoryObjectStorage {
    base_url: String,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    failing: AtomicBool,
}

impl MemoryObjectStorage {
    /// `base_url` stands in for `https://{bucket}.s3.{region}.amazonaws.com`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// When set, every `put` fails with a backend error. Lets tests
    /// exercise upload-failure paths without a real backend.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Bytes currently stored under `key`, if any.
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn put(
        &self,
        key: &str,
        data: &[u8],
        _content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        validate_key(key)?;

        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("simulated backend failure".into()));
        }

        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());

        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> bool {
        self.objects.lock().unwrap().remove(key).is_some()
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.base_url)
    }
}
