//! Object store receipts and listings.
//!
//! Listings serialize with the S3 field names (`Key`, `Size`, `ETag`, ...) so
//! the status endpoint returns the same shape the store itself reports.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What the store returns after a successful put.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreReceipt {
    /// Opaque integrity tag (ETag), as returned by the store
    pub etag: Option<String>,
    /// Present only when the bucket is versioned
    pub version_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectSummary {
    pub key: String,
    pub size: Option<i64>,
    pub last_modified: Option<String>,
    #[serde(rename = "ETag")]
    pub etag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectListing {
    pub objects: Vec<ObjectSummary>,
    pub key_count: i32,
    pub is_truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct BucketSummary {
    pub name: Option<String>,
    pub creation_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct StoreOwner {
    #[serde(rename = "ID")]
    pub id: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BucketListing {
    pub buckets: Vec<BucketSummary>,
    pub owner: Option<StoreOwner>,
}
