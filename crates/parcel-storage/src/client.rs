//! Store client used by the upload pipeline and the status endpoint.
//!
//! Wraps an optional [`ObjectStore`]: when the store configuration is
//! incomplete there is no backend, and the client reports itself as not
//! configured instead of failing at startup.

use std::sync::Arc;
use std::time::Instant;

use parcel_core::{BucketListing, ObjectListing, StoreReceipt};

use crate::traits::{ObjectStore, StorageError, StorageResult};

#[derive(Clone)]
pub struct StoreClient {
    backend: Option<Arc<dyn ObjectStore>>,
    custom_domain: Option<String>,
}

impl StoreClient {
    pub fn new(backend: Arc<dyn ObjectStore>, custom_domain: Option<String>) -> Self {
        Self {
            backend: Some(backend),
            custom_domain,
        }
    }

    /// Client without a backend; every store operation fails with `NotConfigured`.
    pub fn unconfigured(custom_domain: Option<String>) -> Self {
        Self {
            backend: None,
            custom_domain,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub fn custom_domain(&self) -> Option<&str> {
        self.custom_domain.as_deref()
    }

    pub fn bucket(&self) -> Option<&str> {
        self.backend.as_ref().map(|b| b.bucket())
    }

    fn backend(&self) -> StorageResult<&Arc<dyn ObjectStore>> {
        self.backend
            .as_ref()
            .ok_or_else(|| StorageError::NotConfigured("object store credentials".to_string()))
    }

    pub async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<StoreReceipt> {
        let backend = self.backend()?;
        let size = data.len();
        let start = Instant::now();

        let receipt = backend.put_object(key, data, content_type).await?;

        tracing::debug!(
            backend = %backend.backend_type(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object stored"
        );

        Ok(receipt)
    }

    /// List objects in the configured bucket.
    pub async fn list_objects(&self, max_keys: i32) -> StorageResult<ObjectListing> {
        let backend = self.backend()?;
        backend.list_objects(backend.bucket(), max_keys).await
    }

    pub async fn list_buckets(&self) -> StorageResult<BucketListing> {
        self.backend()?.list_buckets().await
    }

    /// Public URL for `key` under the custom domain, if one is configured.
    ///
    /// Pure string construction: the object is not checked for existence.
    pub fn public_url(&self, key: &str) -> Option<String> {
        let domain = self.custom_domain.as_deref()?;
        let domain = domain.trim_end_matches('/');
        if domain.starts_with("http") {
            Some(format!("{}/{}", domain, key))
        } else {
            Some(format!("https://{}/{}", domain, key))
        }
    }
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("configured", &self.is_configured())
            .field("bucket", &self.bucket())
            .field("custom_domain", &self.custom_domain)
            .finish()
    }
}
