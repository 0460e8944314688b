use crate::traits::{ObjectStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::{ByteStream, DateTime, DateTimeFormat};
use aws_sdk_s3::Client;
use parcel_core::{
    BucketListing, BucketSummary, ObjectListing, ObjectSummary, StoreConfig, StoreOwner,
    StoreReceipt,
};

/// S3-compatible storage implementation (Cloudflare R2 by default)
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    endpoint_url: String,
}

impl S3Store {
    /// Create a new S3Store instance
    ///
    /// # Arguments
    /// * `endpoint_url` - Endpoint of the S3-compatible provider
    ///   (e.g. "https://{account}.r2.cloudflarestorage.com", "http://localhost:9000" for MinIO)
    /// * `region` - Region identifier ("auto" for R2)
    /// * `bucket` - Bucket that uploads are written to
    /// * `access_key_id` / `secret_access_key` - Static credentials
    ///
    /// Retries are disabled: a failed put is reported to the caller as is.
    pub fn new(
        endpoint_url: String,
        region: String,
        bucket: String,
        access_key_id: &str,
        secret_access_key: &str,
    ) -> StorageResult<Self> {
        if bucket.is_empty() {
            return Err(StorageError::ConfigError("bucket name is empty".to_string()));
        }

        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "parcel-static",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&endpoint_url)
            .region(Region::new(region))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            // Path-style addressing works with R2, MinIO and other compatible providers
            .force_path_style(true)
            .build();

        Ok(S3Store {
            client: Client::from_conf(s3_config),
            bucket,
            endpoint_url,
        })
    }

    /// Build from a complete store configuration.
    pub fn from_config(config: &StoreConfig) -> StorageResult<Self> {
        let missing = config.missing_fields();
        if !missing.is_empty() {
            return Err(StorageError::NotConfigured(missing.join(", ")));
        }

        let require = |value: &Option<String>, name: &str| {
            value
                .clone()
                .ok_or_else(|| StorageError::NotConfigured(name.to_string()))
        };
        let endpoint_url = config
            .endpoint_url()
            .ok_or_else(|| StorageError::NotConfigured("endpoint".to_string()))?;
        let bucket = require(&config.bucket_name, "bucket name")?;
        let access_key_id = require(&config.access_key_id, "access key id")?;
        let secret_access_key = require(&config.secret_access_key, "secret access key")?;

        Self::new(
            endpoint_url,
            config.region().to_string(),
            bucket,
            &access_key_id,
            &secret_access_key,
        )
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

fn format_timestamp(ts: Option<&DateTime>) -> Option<String> {
    ts.and_then(|t| t.fmt(DateTimeFormat::DateTime).ok())
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<StoreReceipt> {
        let size = data.len();
        let start = std::time::Instant::now();

        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .content_length(size as i64)
            .body(ByteStream::from(data))
            .send()
            .await;

        let output = result.map_err(|e| {
            tracing::error!(
                error = %DisplayErrorContext(&e),
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(StoreReceipt {
            etag: output.e_tag().map(String::from),
            version_id: output.version_id().map(String::from),
        })
    }

    async fn list_objects(&self, bucket: &str, max_keys: i32) -> StorageResult<ObjectListing> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %bucket,
                    "S3 list objects failed"
                );
                StorageError::ListFailed(DisplayErrorContext(&e).to_string())
            })?;

        let objects = output
            .contents()
            .iter()
            .map(|object| ObjectSummary {
                key: object.key().unwrap_or_default().to_string(),
                size: object.size(),
                last_modified: format_timestamp(object.last_modified()),
                etag: object.e_tag().map(String::from),
            })
            .collect::<Vec<_>>();

        Ok(ObjectListing {
            key_count: output.key_count().unwrap_or(objects.len() as i32),
            is_truncated: output.is_truncated().unwrap_or(false),
            objects,
        })
    }

    async fn list_buckets(&self) -> StorageResult<BucketListing> {
        let output = self.client.list_buckets().send().await.map_err(|e| {
            tracing::error!(error = %DisplayErrorContext(&e), "S3 list buckets failed");
            StorageError::ListFailed(DisplayErrorContext(&e).to_string())
        })?;

        let buckets = output
            .buckets()
            .iter()
            .map(|bucket| BucketSummary {
                name: bucket.name().map(String::from),
                creation_date: format_timestamp(bucket.creation_date()),
            })
            .collect();

        let owner = output.owner().map(|owner| StoreOwner {
            id: owner.id().map(String::from),
            display_name: owner.display_name().map(String::from),
        });

        Ok(BucketListing { buckets, owner })
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
