//! Parcel Storage Library
//!
//! This crate provides the object store abstraction, its S3-compatible and
//! in-memory implementations, and the [`StoreClient`] the upload pipeline
//! talks to.
//!
//! # Storage key format
//!
//! Keys are flat: `{unix_millis}_{sanitized_original_name}`. Sanitization
//! replaces every character outside `[A-Za-z0-9.-]` with `_`, so a key never
//! contains `/` and always maps to a single object at the bucket root. Key
//! generation lives in the `keys` module so all callers stay consistent.

pub mod client;
pub mod factory;
pub mod keys;
#[cfg(feature = "storage-memory")]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use client::StoreClient;
pub use factory::create_store_client;
pub use keys::{sanitize_filename, storage_key};
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStore;
pub use parcel_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Store;
pub use traits::{ObjectStore, StorageError, StorageResult};
