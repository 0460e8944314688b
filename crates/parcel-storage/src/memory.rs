use crate::traits::{ObjectStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parcel_core::{BucketListing, BucketSummary, ObjectListing, ObjectSummary, StoreReceipt};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// An object held by [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
    pub etag: String,
    pub version_id: Option<String>,
    pub last_modified: DateTime<Utc>,
}

/// In-process object store
///
/// Backs local development (`STORAGE_BACKEND=memory`) and tests. Objects live
/// until the process exits. Keys are ordered, so listings come back sorted
/// like S3's.
#[derive(Clone)]
pub struct MemoryStore {
    bucket: String,
    versioned: bool,
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
    next_version: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            versioned: false,
            objects: Arc::new(RwLock::new(BTreeMap::new())),
            next_version: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Hand out a version id with every put, like a versioned bucket.
    pub fn versioned(mut self) -> Self {
        self.versioned = true;
        self
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    fn etag_for(data: &[u8]) -> String {
        let digest = Sha256::digest(data);
        format!("\"{}\"", hex::encode(&digest[..16]))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<StoreReceipt> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
        }

        let etag = Self::etag_for(&data);
        let version_id = self
            .versioned
            .then(|| self.next_version.fetch_add(1, Ordering::Relaxed).to_string());

        let object = StoredObject {
            data,
            content_type: content_type.to_string(),
            etag: etag.clone(),
            version_id: version_id.clone(),
            last_modified: Utc::now(),
        };
        self.objects.write().await.insert(key.to_string(), object);

        tracing::debug!(bucket = %self.bucket, key = %key, "Memory put successful");

        Ok(StoreReceipt {
            etag: Some(etag),
            version_id,
        })
    }

    async fn list_objects(&self, bucket: &str, max_keys: i32) -> StorageResult<ObjectListing> {
        if bucket != self.bucket {
            return Err(StorageError::ListFailed(format!(
                "NoSuchBucket: {}",
                bucket
            )));
        }

        let limit = max_keys.max(0) as usize;
        let objects = self.objects.read().await;
        let summaries: Vec<ObjectSummary> = objects
            .iter()
            .take(limit)
            .map(|(key, object)| ObjectSummary {
                key: key.clone(),
                size: Some(object.data.len() as i64),
                last_modified: Some(
                    object
                        .last_modified
                        .to_rfc3339_opts(SecondsFormat::Millis, true),
                ),
                etag: Some(object.etag.clone()),
            })
            .collect();

        Ok(ObjectListing {
            key_count: summaries.len() as i32,
            is_truncated: objects.len() > limit,
            objects: summaries,
        })
    }

    async fn list_buckets(&self) -> StorageResult<BucketListing> {
        Ok(BucketListing {
            buckets: vec![BucketSummary {
                name: Some(self.bucket.clone()),
                creation_date: None,
            }],
            owner: None,
        })
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
