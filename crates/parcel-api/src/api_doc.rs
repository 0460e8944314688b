//! OpenAPI documentation, served at `/api/openapi.json`.

use axum::Json;
use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use parcel_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Parcel API",
        version = "0.1.0",
        description = "Browser-facing file upload service. Files are validated against a size limit and a MIME allow-list, optionally re-encoded, and stored in an S3-compatible bucket."
    ),
    paths(
        handlers::health::health_check,
        handlers::upload::upload_files,
        handlers::upload::upload_options,
        handlers::store::store_status,
    ),
    components(
        schemas(
            error::ErrorResponse,
            handlers::health::HealthResponse,
            handlers::upload::UploadResponse,
            handlers::upload::FileResult,
            handlers::upload::FileInfo,
            handlers::store::BucketsResponse,
            handlers::store::ObjectsResponse,
            handlers::store::StoreNotConfiguredResponse,
            handlers::store::StoreFailureResponse,
            models::StoreReceipt,
            models::BucketSummary,
            models::ObjectSummary,
            models::StoreOwner,
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "upload", description = "File uploads"),
        (name = "store", description = "Object store introspection"),
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/upload"));
        assert!(spec.paths.paths.contains_key("/store"));
        assert!(spec.paths.paths.contains_key("/health"));
    }
}
