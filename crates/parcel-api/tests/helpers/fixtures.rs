//! Test fixtures: multipart parts and transcoders.

use axum_test::multipart::Part;
use parcel_processing::{ImageTranscoder, TranscodeError};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A file part with a filename and declared type.
pub fn file_part(name: &str, content_type: &str, data: Vec<u8>) -> Part {
    Part::bytes(data).file_name(name.to_string()).mime_type(content_type)
}

/// Keeps the first half of every payload and counts calls.
#[derive(Default)]
pub struct HalvingTranscoder {
    calls: AtomicUsize,
}

impl HalvingTranscoder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageTranscoder for HalvingTranscoder {
    fn transcode(
        &self,
        data: &[u8],
        _content_type: &str,
        _quality: u8,
    ) -> Result<Vec<u8>, TranscodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(data[..data.len() / 2].to_vec())
    }
}
