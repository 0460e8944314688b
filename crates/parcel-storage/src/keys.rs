//! Storage key generation.
//!
//! Key format: `{unix_millis}_{sanitized_original_name}`.

/// Replace every character outside `[A-Za-z0-9.-]` with `_`.
///
/// Works per Unicode scalar value, so a multi-byte character becomes a single
/// underscore. The result is safe in URLs and object keys, but `..` survives:
/// keys are flat and never interpreted as paths.
pub fn sanitize_filename(original_name: &str) -> String {
    original_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Derive the storage key for a file uploaded at `timestamp_millis`.
///
/// Deterministic. Two files with the same name in the same millisecond get
/// the same key and the later put wins.
pub fn storage_key(original_name: &str, timestamp_millis: i64) -> String {
    format!("{}_{}", timestamp_millis, sanitize_filename(original_name))
}
