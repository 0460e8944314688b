#![allow(dead_code)]

//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p parcel-api`. Every server is backed
//! by an in-process store; nothing touches the network.

pub mod fixtures;

use async_trait::async_trait;
use axum_test::TestServer;
use parcel_api::setup::routes;
use parcel_api::AppState;
use parcel_core::{BucketListing, Config, ObjectListing, StorageBackend, StoreReceipt};
use parcel_processing::ImageTranscoder;
use parcel_storage::{MemoryStore, ObjectStore, StorageError, StorageResult, StoreClient};
use std::sync::Arc;

pub const TEST_BUCKET: &str = "test-uploads";
pub const TEST_DOMAIN: &str = "cdn.example.com";

/// Test application: server plus the store behind it.
pub struct TestApp {
    pub server: TestServer,
    pub store: MemoryStore,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn build_server(config: Config, state: AppState) -> TestServer {
    let router = routes::setup_routes(&config, Arc::new(state)).expect("Failed to build routes");
    TestServer::new(router).expect("Failed to start test server")
}

/// Server backed by a [`MemoryStore`], with an optional custom domain.
pub fn setup_test_app(custom_domain: Option<&str>) -> TestApp {
    setup_test_app_with(Config::default(), custom_domain, None)
}

/// Same as [`setup_test_app`], with a custom config and optionally a
/// replacement image transcoder.
pub fn setup_test_app_with(
    config: Config,
    custom_domain: Option<&str>,
    transcoder: Option<Arc<dyn ImageTranscoder>>,
) -> TestApp {
    let store = MemoryStore::new(TEST_BUCKET);
    let client = StoreClient::new(Arc::new(store.clone()), custom_domain.map(String::from));
    let mut state = AppState::new(config.clone(), client);
    if transcoder.is_some() {
        state.pipeline = state.pipeline.with_transcoder(transcoder);
    }
    TestApp {
        server: build_server(config, state),
        store,
    }
}

/// Server whose store is not configured.
pub fn setup_unconfigured_app(config: Config) -> TestServer {
    let state = AppState::new(config.clone(), StoreClient::unconfigured(None));
    build_server(config, state)
}

/// Server whose store fails every call.
pub fn setup_failing_app() -> TestServer {
    let config = Config::default();
    let client = StoreClient::new(Arc::new(FailingStore), Some(TEST_DOMAIN.to_string()));
    build_server(config.clone(), AppState::new(config, client))
}

/// Object store that is reachable on paper but rejects every request.
pub struct FailingStore;

#[async_trait]
impl ObjectStore for FailingStore {
    async fn put_object(
        &self,
        _key: &str,
        _data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<StoreReceipt> {
        Err(StorageError::UploadFailed("AccessDenied".to_string()))
    }

    async fn list_objects(&self, _bucket: &str, _max_keys: i32) -> StorageResult<ObjectListing> {
        Err(StorageError::ListFailed("InvalidAccessKeyId".to_string()))
    }

    async fn list_buckets(&self) -> StorageResult<BucketListing> {
        Err(StorageError::ListFailed("InvalidAccessKeyId".to_string()))
    }

    fn bucket(&self) -> &str {
        TEST_BUCKET
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
