//! Upload policy defaults and environment variable names.

/// Default per-file size limit in megabytes.
pub const DEFAULT_MAX_FILE_SIZE_MB: usize = 5;

/// Default limit for a whole multipart request body in megabytes.
pub const DEFAULT_MAX_REQUEST_BODY_MB: usize = 100;

/// Quality handed to the image transcoder when compression is requested.
pub const DEFAULT_COMPRESSION_QUALITY: u8 = 70;

/// Maximum number of keys returned by the object listing endpoint.
pub const LIST_OBJECTS_MAX_KEYS: i32 = 100;

/// Region used for S3-compatible providers that ignore it (Cloudflare R2).
pub const DEFAULT_STORE_REGION: &str = "auto";

pub const DEFAULT_ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "text/plain",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Declared types the image transcoder is allowed to re-encode.
pub const COMPRESSIBLE_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

pub const ENV_ACCOUNT_ID: &str = "R2_ACCOUNT_ID";
pub const ENV_ACCESS_KEY_ID: &str = "R2_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "R2_SECRET_ACCESS_KEY";
pub const ENV_BUCKET_NAME: &str = "R2_BUCKET_NAME";
pub const ENV_CUSTOM_DOMAIN: &str = "R2_CUSTOM_DOMAIN";
pub const ENV_ENDPOINT: &str = "R2_ENDPOINT";
pub const ENV_REGION: &str = "R2_REGION";

/// Variables reported back to operators when the store is not configured.
pub const STORE_ENV_VARS: &[&str] = &[
    ENV_ACCOUNT_ID,
    ENV_ACCESS_KEY_ID,
    ENV_SECRET_ACCESS_KEY,
    ENV_BUCKET_NAME,
    ENV_CUSTOM_DOMAIN,
];
