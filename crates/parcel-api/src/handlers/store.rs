//! Object store status and introspection.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parcel_core::constants::{LIST_OBJECTS_MAX_KEYS, STORE_ENV_VARS};
use parcel_core::{AppError, BucketSummary, ObjectSummary, StoreOwner};
use parcel_storage::StorageError;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StoreQuery {
    /// "list-buckets" or "list-objects" (default)
    action: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreAction {
    ListBuckets,
    ListObjects,
}

impl StoreAction {
    fn parse(action: Option<&str>) -> Option<Self> {
        match action.unwrap_or("list-objects") {
            "list-buckets" => Some(StoreAction::ListBuckets),
            "list-objects" => Some(StoreAction::ListObjects),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreNotConfiguredResponse {
    pub error: String,
    pub configured: bool,
    pub required_env_vars: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreFailureResponse {
    pub error: String,
    pub details: String,
    pub configured: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BucketsResponse {
    pub success: bool,
    pub buckets: Vec<BucketSummary>,
    pub owner: Option<StoreOwner>,
    pub custom_domain: Option<String>,
    pub custom_domain_configured: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectsResponse {
    pub success: bool,
    pub bucket: Option<String>,
    pub objects: Vec<ObjectSummary>,
    pub key_count: i32,
    pub is_truncated: bool,
}

/// Inspect the configured object store
#[utoipa::path(
    get,
    path = "/store",
    tag = "store",
    params(StoreQuery),
    responses(
        (status = 200, description = "Object listing (at most 100 keys); `BucketsResponse` for action=list-buckets", body = ObjectsResponse),
        (status = 400, description = "Store not configured, or unknown action", body = StoreNotConfiguredResponse),
        (status = 500, description = "Store request failed", body = StoreFailureResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn store_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StoreQuery>,
) -> Result<Response, HttpAppError> {
    if !state.store.is_configured() {
        let body = StoreNotConfiguredResponse {
            error: "Object store is not configured. Please set up your environment variables."
                .to_string(),
            configured: false,
            required_env_vars: STORE_ENV_VARS.iter().map(|v| v.to_string()).collect(),
        };
        return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
    }

    let action = StoreAction::parse(query.action.as_deref()).ok_or_else(|| {
        AppError::InvalidInput(
            "Invalid action. Use \"list-buckets\" or \"list-objects\"".to_string(),
        )
    })?;

    let response = match action {
        StoreAction::ListBuckets => match state.store.list_buckets().await {
            Ok(listing) => Json(BucketsResponse {
                success: true,
                buckets: listing.buckets,
                owner: listing.owner,
                custom_domain: state.store.custom_domain().map(String::from),
                custom_domain_configured: state.store.custom_domain().is_some(),
            })
            .into_response(),
            Err(e) => store_failure(&state, e),
        },
        StoreAction::ListObjects => match state.store.list_objects(LIST_OBJECTS_MAX_KEYS).await {
            Ok(listing) => Json(ObjectsResponse {
                success: true,
                bucket: state.store.bucket().map(String::from),
                objects: listing.objects,
                key_count: listing.key_count,
                is_truncated: listing.is_truncated,
            })
            .into_response(),
            Err(e) => store_failure(&state, e),
        },
    };

    Ok(response)
}

fn store_failure(state: &AppState, err: StorageError) -> Response {
    tracing::error!(error = %err, "Object store request failed");
    let body = StoreFailureResponse {
        error: "Failed to connect to storage".to_string(),
        details: err.to_string(),
        configured: state.store.is_configured(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
