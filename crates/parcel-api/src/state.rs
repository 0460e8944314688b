//! Application state shared by all handlers.

use parcel_core::Config;
use parcel_processing::UploadPipeline;
use parcel_storage::StoreClient;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub store: StoreClient,
    pub pipeline: UploadPipeline,
}

impl AppState {
    /// Build state around an existing store client. The pipeline shares it.
    pub fn new(config: Config, store: StoreClient) -> Self {
        let pipeline = UploadPipeline::new(&config.upload, store.clone());
        Self {
            config,
            store,
            pipeline,
        }
    }
}
