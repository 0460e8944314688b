//! Upload pipeline: validate → (transcode) → key → (store) → URL.
//!
//! Every item in a batch runs as its own task. A failure in one item becomes
//! a [`Rejection`] in that item's slot and never touches its siblings; the
//! only batch-level failure is a task that panicked.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;

use parcel_core::{AcceptedFile, Rejection, UnstoredMode, UploadConfig, UploadItem, UploadOutcome};
use parcel_storage::{storage_key, StoreClient};

use crate::compression::{is_compressible, ImageTranscoder};
use crate::validator::UploadPolicy;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Upload task failed: {0}")]
    TaskFailed(String),
}

#[derive(Clone)]
pub struct UploadPipeline {
    policy: Arc<UploadPolicy>,
    store: StoreClient,
    transcoder: Option<Arc<dyn ImageTranscoder>>,
    quality: u8,
    unstored_mode: UnstoredMode,
}

impl UploadPipeline {
    /// Build a pipeline from upload configuration.
    ///
    /// Uses [`ImageCompressor`](crate::ImageCompressor) when the `image`
    /// feature is enabled; otherwise compression requests pass files through.
    pub fn new(config: &UploadConfig, store: StoreClient) -> Self {
        #[cfg(feature = "image")]
        let transcoder: Option<Arc<dyn ImageTranscoder>> =
            Some(Arc::new(crate::compression::ImageCompressor::new()));
        #[cfg(not(feature = "image"))]
        let transcoder: Option<Arc<dyn ImageTranscoder>> = None;

        Self {
            policy: Arc::new(UploadPolicy::from_config(config)),
            store,
            transcoder,
            quality: config.compression_quality,
            unstored_mode: config.unstored_mode,
        }
    }

    pub fn with_transcoder(mut self, transcoder: Option<Arc<dyn ImageTranscoder>>) -> Self {
        self.transcoder = transcoder;
        self
    }

    pub fn store(&self) -> &StoreClient {
        &self.store
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Process a batch concurrently. Outcomes come back in input order, one
    /// per item.
    #[tracing::instrument(skip(self, items), fields(items = items.len()))]
    pub async fn process_batch(
        &self,
        items: Vec<UploadItem>,
        compress: bool,
    ) -> Result<Vec<UploadOutcome>, PipelineError> {
        let handles = items
            .into_iter()
            .map(|item| {
                let pipeline = self.clone();
                tokio::spawn(async move { pipeline.process_item(item, compress).await })
            })
            .collect::<Vec<_>>();

        let outcomes = join_all(handles)
            .await
            .into_iter()
            .map(|joined| {
                joined.map_err(|e| {
                    tracing::error!(error = %e, "Upload task did not complete");
                    PipelineError::TaskFailed(e.to_string())
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let accepted = outcomes.iter().filter(|o| o.is_accepted()).count();
        tracing::info!(
            accepted = accepted,
            rejected = outcomes.len() - accepted,
            "Upload batch processed"
        );

        Ok(outcomes)
    }

    /// Run one item through the pipeline.
    pub async fn process_item(&self, item: UploadItem, compress: bool) -> UploadOutcome {
        let filename = item.original_name.clone();
        let started = Instant::now();
        match self.run(item, compress).await {
            Ok(file) => {
                tracing::info!(
                    key = %file.storage_key,
                    size_bytes = file.size,
                    stored = file.receipt.is_some(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "File accepted"
                );
                UploadOutcome::Accepted(file)
            }
            Err(rejection) => {
                tracing::info!(
                    filename = %filename,
                    reason = rejection.code(),
                    "File rejected"
                );
                UploadOutcome::Rejected(rejection)
            }
        }
    }

    async fn run(&self, item: UploadItem, compress: bool) -> Result<AcceptedFile, Rejection> {
        self.policy.validate(&item)?;

        let UploadItem {
            original_name,
            content_type,
            mut data,
        } = item;

        if compress && is_compressible(&content_type) {
            if let Some(transcoder) = &self.transcoder {
                data = self
                    .transcode(transcoder.clone(), data, &content_type, &original_name)
                    .await?;
            }
        }

        let uploaded_at = Utc::now();
        let key = storage_key(&original_name, uploaded_at.timestamp_millis());
        let size = data.len();

        if !self.store.is_configured() {
            return match self.unstored_mode {
                UnstoredMode::Accept => Ok(AcceptedFile {
                    original_name,
                    storage_key: key,
                    size,
                    content_type,
                    uploaded_at,
                    public_url: None,
                    receipt: None,
                }),
                UnstoredMode::Reject => Err(Rejection::StoreUnavailable {
                    filename: original_name,
                }),
            };
        }

        let receipt = match self.store.put_object(&key, data, &content_type).await {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Failed to store file");
                return Err(Rejection::StoreFailed {
                    filename: original_name,
                });
            }
        };

        let public_url = self.store.public_url(&key);

        Ok(AcceptedFile {
            original_name,
            storage_key: key,
            size,
            content_type,
            uploaded_at,
            public_url,
            receipt: Some(receipt),
        })
    }

    async fn transcode(
        &self,
        transcoder: Arc<dyn ImageTranscoder>,
        data: Vec<u8>,
        content_type: &str,
        filename: &str,
    ) -> Result<Vec<u8>, Rejection> {
        let quality = self.quality;
        let declared = content_type.to_string();

        let result =
            tokio::task::spawn_blocking(move || transcoder.transcode(&data, &declared, quality))
                .await;

        match result {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, filename = %filename, "Image compression failed");
                Err(Rejection::CompressionFailed {
                    filename: filename.to_string(),
                })
            }
            Err(e) => {
                tracing::error!(error = %e, filename = %filename, "Image compression task failed");
                Err(Rejection::CompressionFailed {
                    filename: filename.to_string(),
                })
            }
        }
    }
}

impl std::fmt::Debug for UploadPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadPipeline")
            .field("policy", &self.policy)
            .field("store", &self.store)
            .field("transcoder", &self.transcoder.is_some())
            .field("quality", &self.quality)
            .field("unstored_mode", &self.unstored_mode)
            .finish()
    }
}
