//! Domain models
//!
//! `upload` holds the per-request pipeline types; `store` holds what the
//! object store hands back.

pub mod store;
pub mod upload;

pub use store::{
    BucketListing, BucketSummary, ObjectListing, ObjectSummary, StoreOwner, StoreReceipt,
};
pub use upload::{AcceptedFile, Rejection, UploadItem, UploadOutcome};
