use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::SecondsFormat;
use parcel_core::{AppError, StoreReceipt, UploadItem, UploadOutcome};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Multipart field that carries files. Other fields are ignored.
const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    /// Re-encode JPEG, PNG and WebP files when exactly "true"
    compress: Option<String>,
}

impl UploadQuery {
    fn compress(&self) -> bool {
        self.compress.as_deref() == Some("true")
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub original_name: String,
    /// Storage key
    pub filename: String,
    /// Stored size in bytes, after compression
    pub size: usize,
    #[serde(rename = "type")]
    pub content_type: String,
    /// RFC 3339 with millisecond precision, UTC
    pub uploaded_at: String,
    /// Public URL; null without a custom domain or when the file was not stored
    pub url: Option<String>,
    pub upload_metadata: Option<StoreReceipt>,
}

/// Per-file entry in the upload response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum FileResult {
    Uploaded {
        success: bool,
        #[serde(rename = "fileInfo")]
        file_info: FileInfo,
    },
    Failed {
        error: String,
    },
}

impl From<UploadOutcome> for FileResult {
    fn from(outcome: UploadOutcome) -> Self {
        match outcome {
            UploadOutcome::Accepted(file) => FileResult::Uploaded {
                success: true,
                file_info: FileInfo {
                    original_name: file.original_name,
                    filename: file.storage_key,
                    size: file.size,
                    content_type: file.content_type,
                    uploaded_at: file
                        .uploaded_at
                        .to_rfc3339_opts(SecondsFormat::Millis, true),
                    url: file.public_url,
                    upload_metadata: file.receipt,
                },
            },
            UploadOutcome::Rejected(reason) => FileResult::Failed {
                error: reason.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// One entry per file, in request order
    pub results: Vec<FileResult>,
}

/// Upload one or more files
///
/// Every `file` field that carries a filename is processed independently;
/// a rejected file never fails the request.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "upload",
    params(UploadQuery),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Per-file results", body = UploadResponse),
        (status = 400, description = "No files or malformed multipart body", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(compress = query.compress()))]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let items = extract_upload_items(multipart?).await?;

    if items.is_empty() {
        return Err(AppError::BadRequest("No files provided".to_string()).into());
    }

    let outcomes = state
        .pipeline
        .process_batch(items, query.compress())
        .await?;

    Ok(Json(UploadResponse {
        results: outcomes.into_iter().map(FileResult::from).collect(),
    }))
}

/// Collect every `file` field that carries a filename, in body order.
async fn extract_upload_items(mut multipart: Multipart) -> Result<Vec<UploadItem>, HttpAppError> {
    let mut items = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        // A missing Content-Type never matches the allow-list
        let content_type = field.content_type().unwrap_or_default().to_string();

        let data = field.bytes().await?;
        items.push(UploadItem::new(filename, content_type, data.to_vec()));
    }

    Ok(items)
}

/// Explicit preflight answer for clients that probe the upload route.
#[utoipa::path(
    options,
    path = "/upload",
    tag = "upload",
    responses((status = 200, description = "CORS preflight"))
)]
pub async fn upload_options() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use parcel_core::{AcceptedFile, Rejection};

    #[test]
    fn test_compress_flag_is_exact() {
        let query = |v: Option<&str>| UploadQuery {
            compress: v.map(String::from),
        };
        assert!(query(Some("true")).compress());
        assert!(!query(Some("TRUE")).compress());
        assert!(!query(Some("1")).compress());
        assert!(!query(None).compress());
    }

    #[test]
    fn test_accepted_file_json_shape() {
        let outcome = UploadOutcome::Accepted(AcceptedFile {
            original_name: "a b.txt".to_string(),
            storage_key: "1700000000123_a_b.txt".to_string(),
            size: 3,
            content_type: "text/plain".to_string(),
            uploaded_at: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
            public_url: None,
            receipt: None,
        });
        let json = serde_json::to_value(FileResult::from(outcome)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["fileInfo"]["originalName"], "a b.txt");
        assert_eq!(json["fileInfo"]["filename"], "1700000000123_a_b.txt");
        assert_eq!(json["fileInfo"]["type"], "text/plain");
        assert_eq!(json["fileInfo"]["uploadedAt"], "2023-11-14T22:13:20.123Z");
        assert!(json["fileInfo"]["url"].is_null());
        assert!(json["fileInfo"]["uploadMetadata"].is_null());
    }

    #[test]
    fn test_rejected_file_json_shape() {
        let outcome = UploadOutcome::Rejected(Rejection::TypeNotAllowed {
            filename: "x.exe".to_string(),
            content_type: "application/x-msdownload".to_string(),
        });
        let json = serde_json::to_value(FileResult::from(outcome)).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "File 'x.exe' type not allowed" }));
    }
}
