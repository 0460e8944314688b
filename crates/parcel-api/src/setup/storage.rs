//! Object store client setup

use anyhow::{Context, Result};
use parcel_core::Config;
use parcel_storage::{create_store_client, StoreClient};

pub fn setup_storage(config: &Config) -> Result<StoreClient> {
    let client =
        create_store_client(&config.store).context("Failed to initialize object store")?;

    tracing::info!(
        configured = client.is_configured(),
        bucket = ?client.bucket(),
        custom_domain = ?client.custom_domain(),
        "Object store client ready"
    );

    Ok(client)
}
