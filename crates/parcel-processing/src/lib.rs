//! Parcel Processing Library
//!
//! Upload validation, image re-encoding, and the upload pipeline that turns a
//! batch of [`UploadItem`](parcel_core::UploadItem)s into per-file outcomes.

pub mod compression;
pub mod pipeline;
pub mod validator;

#[cfg(feature = "image")]
pub use compression::ImageCompressor;
/// The codec crate, for callers that build or inspect image payloads.
#[cfg(feature = "image")]
pub use image;
pub use compression::{is_compressible, ImageTranscoder, TranscodeError};
pub use pipeline::{PipelineError, UploadPipeline};
pub use validator::UploadPolicy;
