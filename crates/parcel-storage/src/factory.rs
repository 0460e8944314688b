#[cfg(feature = "storage-memory")]
use crate::MemoryStore;
#[cfg(feature = "storage-s3")]
use crate::{ObjectStore, S3Store};
use crate::{StorageBackend, StorageError, StorageResult, StoreClient};
use parcel_core::StoreConfig;
use std::sync::Arc;

/// Create the store client from configuration.
///
/// An incomplete configuration is not an error: the client comes back
/// unconfigured and uploads follow the pipeline's unstored mode.
pub fn create_store_client(config: &StoreConfig) -> StorageResult<StoreClient> {
    if config.custom_domain.is_none() {
        tracing::warn!("Custom domain is not configured. File URLs will not be generated.");
    }

    if !config.is_configured() {
        tracing::warn!(
            missing = %config.missing_fields().join(","),
            "Object store is not configured. File uploads will return metadata only."
        );
        return Ok(StoreClient::unconfigured(config.custom_domain.clone()));
    }

    match config.backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let store = S3Store::from_config(config)?;
            tracing::info!(
                bucket = %store.bucket(),
                endpoint = %store.endpoint_url(),
                "S3 object store configured"
            );
            Ok(StoreClient::new(
                Arc::new(store),
                config.custom_domain.clone(),
            ))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-memory")]
        StorageBackend::Memory => {
            let bucket = config
                .bucket()
                .ok_or_else(|| StorageError::ConfigError("bucket name missing".to_string()))?;
            tracing::warn!(bucket = %bucket, "Using in-memory object store; uploads are not durable");
            Ok(StoreClient::new(
                Arc::new(MemoryStore::new(bucket)),
                config.custom_domain.clone(),
            ))
        }

        #[cfg(not(feature = "storage-memory"))]
        StorageBackend::Memory => Err(StorageError::ConfigError(
            "Memory storage backend not available (storage-memory feature not enabled)"
                .to_string(),
        )),
    }
}
