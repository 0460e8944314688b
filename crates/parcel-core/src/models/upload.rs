//! Upload items and their per-file outcomes.

use chrono::{DateTime, Utc};

use super::store::StoreReceipt;

/// One file taken from the multipart body, alive for a single batch.
#[derive(Clone)]
pub struct UploadItem {
    /// Filename as sent by the browser; may contain any characters
    pub original_name: String,
    /// Declared MIME type; never sniffed from content
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadItem {
    pub fn new(
        original_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

impl std::fmt::Debug for UploadItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadItem")
            .field("original_name", &self.original_name)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}

/// A file that made it through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedFile {
    pub original_name: String,
    pub storage_key: String,
    /// Byte length after optional compression
    pub size: usize,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
    /// `None` when no custom domain is configured or the file was not stored
    pub public_url: Option<String>,
    /// `None` when the file was accepted without being stored
    pub receipt: Option<StoreReceipt>,
}

/// Why a single file was turned away. Never aborts sibling files.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("File '{filename}' size exceeds {} limit", format_limit(.max_bytes))]
    FileTooLarge {
        filename: String,
        size: usize,
        max_bytes: usize,
    },

    #[error("File '{filename}' type not allowed")]
    TypeNotAllowed {
        filename: String,
        content_type: String,
    },

    #[error("Failed to compress image '{filename}'")]
    CompressionFailed { filename: String },

    #[error("Failed to upload '{filename}' to storage")]
    StoreFailed { filename: String },

    #[error("Storage is not configured, '{filename}' was not uploaded")]
    StoreUnavailable { filename: String },
}

impl Rejection {
    /// Machine-readable cause, used in logs.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::FileTooLarge { .. } => "file_too_large",
            Rejection::TypeNotAllowed { .. } => "type_not_allowed",
            Rejection::CompressionFailed { .. } => "compression_failed",
            Rejection::StoreFailed { .. } => "store_failed",
            Rejection::StoreUnavailable { .. } => "store_unavailable",
        }
    }
}

fn format_limit(max_bytes: &usize) -> String {
    const MB: usize = 1024 * 1024;
    if *max_bytes >= MB && max_bytes % MB == 0 {
        format!("{}MB", max_bytes / MB)
    } else {
        format!("{} bytes", max_bytes)
    }
}

/// Result of running one [`UploadItem`] through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Accepted(AcceptedFile),
    Rejected(Rejection),
}

impl UploadOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, UploadOutcome::Accepted(_))
    }

    pub fn accepted(&self) -> Option<&AcceptedFile> {
        match self {
            UploadOutcome::Accepted(file) => Some(file),
            UploadOutcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            UploadOutcome::Accepted(_) => None,
            UploadOutcome::Rejected(reason) => Some(reason),
        }
    }
}

impl From<Rejection> for UploadOutcome {
    fn from(reason: Rejection) -> Self {
        UploadOutcome::Rejected(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_message_mentions_limit_in_mb() {
        let reason = Rejection::FileTooLarge {
            filename: "photo.jpg".to_string(),
            size: 6 * 1024 * 1024,
            max_bytes: 5 * 1024 * 1024,
        };
        assert_eq!(reason.to_string(), "File 'photo.jpg' size exceeds 5MB limit");
        assert_eq!(reason.code(), "file_too_large");
    }

    #[test]
    fn test_size_message_for_odd_limit() {
        let reason = Rejection::FileTooLarge {
            filename: "a.txt".to_string(),
            size: 2000,
            max_bytes: 1500,
        };
        assert_eq!(reason.to_string(), "File 'a.txt' size exceeds 1500 bytes limit");
    }

    #[test]
    fn test_type_message() {
        let reason = Rejection::TypeNotAllowed {
            filename: "run.exe".to_string(),
            content_type: "application/x-msdownload".to_string(),
        };
        assert_eq!(reason.to_string(), "File 'run.exe' type not allowed");
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome: UploadOutcome = Rejection::StoreFailed {
            filename: "a.pdf".to_string(),
        }
        .into();
        assert!(!outcome.is_accepted());
        assert!(outcome.accepted().is_none());
        assert_eq!(outcome.rejection().map(Rejection::code), Some("store_failed"));
    }

    #[test]
    fn test_item_debug_omits_payload() {
        let item = UploadItem::new("a.txt", "text/plain", b"secret body".to_vec());
        let debug = format!("{:?}", item);
        assert!(debug.contains("size: 11"));
        assert!(!debug.contains("secret"));
    }
}
