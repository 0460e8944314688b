//! Configuration module
//!
//! Configuration is read once at startup and passed by value into the store
//! client, the upload pipeline, and the router. Nothing below the binary's
//! `main` reads the process environment; tests build a [`Config`] directly or
//! through [`Config::from_lookup`].

use std::env;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_ALLOWED_CONTENT_TYPES, DEFAULT_COMPRESSION_QUALITY, DEFAULT_MAX_FILE_SIZE_MB,
    DEFAULT_MAX_REQUEST_BODY_MB, DEFAULT_STORE_REGION, ENV_ACCESS_KEY_ID, ENV_ACCOUNT_ID,
    ENV_BUCKET_NAME, ENV_CUSTOM_DOMAIN, ENV_ENDPOINT, ENV_REGION, ENV_SECRET_ACCESS_KEY,
};
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 4000;
const MEMORY_BUCKET_NAME: &str = "memory";

/// What the pipeline does with a valid file when no object store is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnstoredMode {
    /// Report the file as accepted with no URL and no store receipt.
    /// Useful for exercising validation and compression without a backend.
    #[default]
    Accept,
    /// Reject every file that passed validation because it cannot be stored.
    Reject,
}

impl FromStr for UnstoredMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accept" => Ok(UnstoredMode::Accept),
            "reject" => Ok(UnstoredMode::Reject),
            _ => Err(anyhow::anyhow!(
                "Invalid unstored mode: {} (expected 'accept' or 'reject')",
                s
            )),
        }
    }
}

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub max_request_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            max_request_body_bytes: DEFAULT_MAX_REQUEST_BODY_MB * 1024 * 1024,
        }
    }
}

/// Per-file upload policy and pipeline behavior
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub max_file_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
    pub compression_quality: u8,
    pub unstored_mode: UnstoredMode,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
            allowed_content_types: DEFAULT_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            compression_quality: DEFAULT_COMPRESSION_QUALITY,
            unstored_mode: UnstoredMode::Accept,
        }
    }
}

/// Object store identity, credentials, and public URL settings
#[derive(Clone, Default)]
pub struct StoreConfig {
    pub backend: StorageBackend,
    pub account_id: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket_name: Option<String>,
    pub custom_domain: Option<String>,
    /// Custom endpoint for S3-compatible providers other than R2 (MinIO, Spaces, ...)
    pub endpoint: Option<String>,
    pub region: Option<String>,
}

// Credentials never end up in logs.
impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("backend", &self.backend)
            .field("account_id", &self.account_id)
            .field("access_key_id", &self.access_key_id.as_ref().map(|_| "***"))
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "***"),
            )
            .field("bucket_name", &self.bucket_name)
            .field("custom_domain", &self.custom_domain)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .finish()
    }
}

impl StoreConfig {
    /// True iff the backend can be constructed.
    ///
    /// For S3 this requires account id, access key id, secret access key, and
    /// bucket name. The in-memory backend needs nothing.
    pub fn is_configured(&self) -> bool {
        match self.backend {
            StorageBackend::S3 => self.missing_fields().is_empty(),
            StorageBackend::Memory => true,
        }
    }

    /// Names of the required S3 variables that are absent.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            (ENV_ACCOUNT_ID, &self.account_id),
            (ENV_ACCESS_KEY_ID, &self.access_key_id),
            (ENV_SECRET_ACCESS_KEY, &self.secret_access_key),
            (ENV_BUCKET_NAME, &self.bucket_name),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    /// Endpoint for the S3 client: explicit override, else the R2 account endpoint.
    pub fn endpoint_url(&self) -> Option<String> {
        self.endpoint.clone().or_else(|| {
            self.account_id
                .as_ref()
                .map(|id| format!("https://{}.r2.cloudflarestorage.com", id))
        })
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_STORE_REGION)
    }

    pub fn bucket(&self) -> Option<&str> {
        match self.backend {
            StorageBackend::S3 => self.bucket_name.as_deref(),
            StorageBackend::Memory => {
                Some(self.bucket_name.as_deref().unwrap_or(MEMORY_BUCKET_NAME))
            }
        }
    }
}

/// Application configuration
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub store: StoreConfig,
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let environment = get("ENVIRONMENT")
            .or_else(|| get("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = get("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_name(&environment) && cors_origins_str == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let port = match get("PORT") {
            Some(p) => p
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let max_request_body_mb = get("MAX_REQUEST_BODY_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_REQUEST_BODY_MB);

        let max_file_size_mb = get("MAX_FILE_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);

        let allowed_content_types = match get("ALLOWED_CONTENT_TYPES") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            None => UploadConfig::default().allowed_content_types,
        };

        let compression_quality = match get("COMPRESSION_QUALITY") {
            Some(q) => q
                .parse()
                .map_err(|_| anyhow::anyhow!("COMPRESSION_QUALITY must be a number (1-100)"))?,
            None => DEFAULT_COMPRESSION_QUALITY,
        };

        let unstored_mode = match get("UPLOAD_UNSTORED_MODE") {
            Some(mode) => mode.parse()?,
            None => UnstoredMode::default(),
        };

        let backend = match get("STORAGE_BACKEND") {
            Some(b) => b.parse()?,
            None => StorageBackend::default(),
        };

        let config = Config {
            server: ServerConfig {
                port,
                environment,
                cors_origins,
                max_request_body_bytes: mb_to_bytes("MAX_REQUEST_BODY_MB", max_request_body_mb)?,
            },
            upload: UploadConfig {
                max_file_size_bytes: mb_to_bytes("MAX_FILE_SIZE_MB", max_file_size_mb)?,
                allowed_content_types,
                compression_quality,
                unstored_mode,
            },
            store: StoreConfig {
                backend,
                account_id: get(ENV_ACCOUNT_ID),
                access_key_id: get(ENV_ACCESS_KEY_ID),
                secret_access_key: get(ENV_SECRET_ACCESS_KEY),
                bucket_name: get(ENV_BUCKET_NAME),
                custom_domain: get(ENV_CUSTOM_DOMAIN),
                endpoint: get(ENV_ENDPOINT),
                region: get(ENV_REGION),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.server.environment)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if !(1..=100).contains(&self.upload.compression_quality) {
            return Err(anyhow::anyhow!(
                "COMPRESSION_QUALITY must be between 1 and 100, got {}",
                self.upload.compression_quality
            ));
        }
        if self.upload.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_CONTENT_TYPES must contain at least one type"
            ));
        }
        if self.server.max_request_body_bytes < self.upload.max_file_size_bytes {
            return Err(anyhow::anyhow!(
                "MAX_REQUEST_BODY_MB must be at least MAX_FILE_SIZE_MB"
            ));
        }
        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.server.port
    }

    pub fn environment(&self) -> &str {
        &self.server.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.server.cors_origins
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.upload.max_file_size_bytes
    }
}

fn mb_to_bytes(var: &str, mb: usize) -> Result<usize, anyhow::Error> {
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("{} is too large", var))
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_port(), 4000);
        assert_eq!(config.max_file_size_bytes(), 5 * 1024 * 1024);
        assert_eq!(config.upload.compression_quality, 70);
        assert_eq!(config.upload.unstored_mode, UnstoredMode::Accept);
        assert_eq!(config.upload.allowed_content_types.len(), 8);
        assert_eq!(config.store.backend, StorageBackend::S3);
        assert!(!config.store.is_configured());
    }

    #[test]
    fn test_store_configured_requires_all_four_fields() {
        let config = config_from(&[
            (ENV_ACCOUNT_ID, "acct"),
            (ENV_ACCESS_KEY_ID, "key"),
            (ENV_SECRET_ACCESS_KEY, "secret"),
        ])
        .unwrap();
        assert!(!config.store.is_configured());
        assert_eq!(config.store.missing_fields(), vec![ENV_BUCKET_NAME]);

        let config = config_from(&[
            (ENV_ACCOUNT_ID, "acct"),
            (ENV_ACCESS_KEY_ID, "key"),
            (ENV_SECRET_ACCESS_KEY, "secret"),
            (ENV_BUCKET_NAME, "uploads"),
        ])
        .unwrap();
        assert!(config.store.is_configured());
        assert!(config.store.custom_domain.is_none());
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let config = config_from(&[
            (ENV_ACCOUNT_ID, "acct"),
            (ENV_ACCESS_KEY_ID, "key"),
            (ENV_SECRET_ACCESS_KEY, "secret"),
            (ENV_BUCKET_NAME, "  "),
        ])
        .unwrap();
        assert!(!config.store.is_configured());
    }

    #[test]
    fn test_endpoint_url_derivation() {
        let mut store = StoreConfig {
            account_id: Some("abc123".to_string()),
            ..Default::default()
        };
        assert_eq!(
            store.endpoint_url().as_deref(),
            Some("https://abc123.r2.cloudflarestorage.com")
        );
        store.endpoint = Some("http://localhost:9000".to_string());
        assert_eq!(store.endpoint_url().as_deref(), Some("http://localhost:9000"));
        assert_eq!(store.region(), "auto");
    }

    #[test]
    fn test_memory_backend_is_always_configured() {
        let config = config_from(&[("STORAGE_BACKEND", "memory")]).unwrap();
        assert!(config.store.is_configured());
        assert_eq!(config.store.bucket(), Some("memory"));
    }

    #[test]
    fn test_production_rejects_wildcard_cors() {
        assert!(config_from(&[("ENVIRONMENT", "production")]).is_err());
        let config = config_from(&[
            ("ENVIRONMENT", "prod"),
            ("CORS_ORIGINS", "https://app.example.com"),
        ])
        .unwrap();
        assert!(config.is_production());
        assert_eq!(config.cors_origins(), &["https://app.example.com".to_string()]);
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("PORT", "abc")]).is_err());
        assert!(config_from(&[("COMPRESSION_QUALITY", "0")]).is_err());
        assert!(config_from(&[("COMPRESSION_QUALITY", "101")]).is_err());
        assert!(config_from(&[("UPLOAD_UNSTORED_MODE", "maybe")]).is_err());
        assert!(config_from(&[("MAX_FILE_SIZE_MB", "0")]).is_err());
        assert!(config_from(&[("MAX_FILE_SIZE_MB", "50"), ("MAX_REQUEST_BODY_MB", "10")]).is_err());
    }

    #[test]
    fn test_size_limits_that_overflow_are_rejected() {
        let huge = (usize::MAX / (1024 * 1024) + 1).to_string();

        let err = config_from(&[("MAX_FILE_SIZE_MB", huge.as_str())]).unwrap_err();
        assert_eq!(err.to_string(), "MAX_FILE_SIZE_MB is too large");

        let err = config_from(&[("MAX_REQUEST_BODY_MB", huge.as_str())]).unwrap_err();
        assert_eq!(err.to_string(), "MAX_REQUEST_BODY_MB is too large");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("MAX_FILE_SIZE_MB", "10"),
            ("ALLOWED_CONTENT_TYPES", "image/png, Text/Plain"),
            ("UPLOAD_UNSTORED_MODE", "reject"),
        ])
        .unwrap();
        assert_eq!(config.max_file_size_bytes(), 10 * 1024 * 1024);
        assert_eq!(
            config.upload.allowed_content_types,
            vec!["image/png".to_string(), "text/plain".to_string()]
        );
        assert_eq!(config.upload.unstored_mode, UnstoredMode::Reject);
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let store = StoreConfig {
            access_key_id: Some("AKIAEXAMPLE".to_string()),
            secret_access_key: Some("topsecret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", store);
        assert!(!debug.contains("AKIAEXAMPLE"));
        assert!(!debug.contains("topsecret"));
    }
}
