//! Object store abstraction trait
//!
//! This module defines the ObjectStore trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use parcel_core::{BucketListing, ObjectListing, StoreReceipt};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Listing failed: {0}")]
    ListFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage not configured: missing {0}")]
    NotConfigured(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Object store abstraction trait
///
/// Every operation is independently failable and none is retried. `put_object`
/// must be safe to call concurrently for distinct keys; concurrent puts to the
/// same key race at the store and the last write wins.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create or overwrite the object at `key` in the configured bucket.
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<StoreReceipt>;

    /// List up to `max_keys` objects in `bucket`.
    async fn list_objects(&self, bucket: &str, max_keys: i32) -> StorageResult<ObjectListing>;

    /// List the buckets visible to the configured credentials.
    async fn list_buckets(&self) -> StorageResult<BucketListing>;

    /// Bucket that `put_object` writes to
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
