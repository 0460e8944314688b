use parcel_core::{Rejection, UploadConfig, UploadItem};

/// Per-file upload policy: size limit and declared-type allow-list.
///
/// Pure and cheap to clone. Content is never inspected; the declared MIME
/// type is matched exactly against the allow-list.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_file_size: usize,
    allowed_content_types: Vec<String>,
}

impl UploadPolicy {
    pub fn new(max_file_size: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(
            config.max_file_size_bytes,
            config.allowed_content_types.clone(),
        )
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.allowed_content_types
    }

    pub fn validate_file_size(&self, item: &UploadItem) -> Result<(), Rejection> {
        if item.size() > self.max_file_size {
            return Err(Rejection::FileTooLarge {
                filename: item.original_name.clone(),
                size: item.size(),
                max_bytes: self.max_file_size,
            });
        }
        Ok(())
    }

    pub fn validate_content_type(&self, item: &UploadItem) -> Result<(), Rejection> {
        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct == &item.content_type)
        {
            return Err(Rejection::TypeNotAllowed {
                filename: item.original_name.clone(),
                content_type: item.content_type.clone(),
            });
        }
        Ok(())
    }

    /// Run all checks. Size is checked before type, so an oversized file of a
    /// disallowed type is reported as too large.
    pub fn validate(&self, item: &UploadItem) -> Result<(), Rejection> {
        self.validate_file_size(item)?;
        self.validate_content_type(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: usize = 1024 * 1024;

    fn policy() -> UploadPolicy {
        UploadPolicy::from_config(&UploadConfig::default())
    }

    #[test]
    fn test_accepts_allowed_type_within_limit() {
        let item = UploadItem::new("notes.txt", "text/plain", b"hello".to_vec());
        assert!(policy().validate(&item).is_ok());
    }

    #[test]
    fn test_size_at_limit_is_allowed() {
        let item = UploadItem::new("exact.pdf", "application/pdf", vec![0; 5 * MB]);
        assert!(policy().validate(&item).is_ok());
    }

    #[test]
    fn test_oversized_rejected_regardless_of_type() {
        for content_type in ["image/png", "application/x-msdownload", ""] {
            let item = UploadItem::new("big.bin", content_type, vec![0; 5 * MB + 1]);
            let rejection = policy().validate(&item).unwrap_err();
            assert!(
                matches!(rejection, Rejection::FileTooLarge { max_bytes, .. } if max_bytes == 5 * MB),
                "{content_type}: {rejection:?}"
            );
            assert_eq!(
                rejection.to_string(),
                "File 'big.bin' size exceeds 5MB limit"
            );
        }
    }

    #[test]
    fn test_disallowed_type_within_size() {
        let item = UploadItem::new("run.exe", "application/x-msdownload", vec![1, 2, 3]);
        let rejection = policy().validate(&item).unwrap_err();
        assert_eq!(rejection.to_string(), "File 'run.exe' type not allowed");
    }

    #[test]
    fn test_type_match_is_exact() {
        let upper = UploadItem::new("a.png", "IMAGE/PNG", vec![1]);
        assert!(policy().validate(&upper).is_err());

        let with_params = UploadItem::new("a.txt", "text/plain; charset=utf-8", vec![1]);
        assert!(policy().validate(&with_params).is_err());

        let missing = UploadItem::new("a", "", vec![1]);
        assert!(policy().validate(&missing).is_err());
    }

    #[test]
    fn test_custom_allow_list() {
        let policy = UploadPolicy::new(10, vec!["application/json".to_string()]);
        let json = UploadItem::new("a.json", "application/json", b"{}".to_vec());
        let png = UploadItem::new("a.png", "image/png", vec![1]);
        assert!(policy.validate(&json).is_ok());
        assert!(matches!(
            policy.validate(&png),
            Err(Rejection::TypeNotAllowed { .. })
        ));
        assert_eq!(policy.max_file_size(), 10);
    }
}
