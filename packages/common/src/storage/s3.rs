use async_trait::async_trait;
use s3::Bucket;
use s3::creds::Credentials;
use s3::region::Region;
use serde::Deserialize;

use super::error::StorageError;
use super::traits::{ObjectStorage, validate_key};

/// Connection settings for the S3-backed gateway.
///
/// Built once at startup from the application configuration and injected
/// into [`S3ObjectStorage::new`]; business logic never reads ambient state.
#[derive(Debug, Deserialize, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
    /// Custom endpoint for S3-compatible backends (MinIO etc.).
    /// When set, path-style addressing is used and public URLs are built
    /// as `{endpoint}/{bucket}/{key}`.
    pub endpoint: Option<String>,
    /// Upper bound on a single object, in bytes. Unlimited when unset.
    pub max_object_size: Option<u64>,
}

/// S3-backed object storage gateway.
pub struct S3ObjectStorage {
    bucket: Box<Bucket>,
    bucket_name: String,
    region: String,
    endpoint: Option<String>,
    max_object_size: Option<u64>,
}

impl S3ObjectStorage {
    pub fn new(config: &S3Config) -> Result<Self, StorageError> {
        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.trim_end_matches('/').to_string(),
            },
            None => config
                .region
                .parse()
                .map_err(|e| StorageError::Configuration(format!("invalid region: {e}")))?,
        };

        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            config.session_token.as_deref(),
            None,
            None,
        )
        .map_err(|e| StorageError::Configuration(format!("invalid credentials: {e}")))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StorageError::Configuration(e.to_string()))?;
        if config.endpoint.is_some() {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            bucket_name: config.bucket.clone(),
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
            max_object_size: config.max_object_size,
        })
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn put(
        &self,
        key: &str,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        validate_key(key)?;

        if let Some(limit) = self.max_object_size
            && data.len() as u64 > limit
        {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit,
            });
        }

        let content_type = content_type.unwrap_or("application/octet-stream");
        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Backend(format!(
                "unexpected status {status} uploading '{key}'"
            )));
        }

        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> bool {
        match self.bucket.delete_object(key).await {
            Ok(response) => {
                let status = response.status_code();
                if (200..300).contains(&status) {
                    true
                } else {
                    tracing::warn!(key, status, "unexpected status deleting object");
                    false
                }
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to delete object");
                false
            }
        }
    }

    fn public_url(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!(
                "{}/{}/{key}",
                endpoint.trim_end_matches('/'),
                self.bucket_name
            ),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{key}",
                self.bucket_name, self.region
            ),
        }
    }
}
