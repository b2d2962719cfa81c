/// Object storage upload module
///
/// This module handles:
/// - Staging the upload candidate to a unique temporary file
///   (PNG for camera captures, quality-95 JPEG for loaded files)
/// - Building timestamped object keys and the matching public URLs
/// - The PutObject call against the S3-compatible bucket

pub mod bucket;

pub use bucket::{object_key, public_url, upload_capture};

use thiserror::Error;

/// Errors raised on the upload path. All of them are caught at the
/// send-action boundary — an upload failure never takes the UI down.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Staging the bitmap to PNG/JPEG failed
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    /// Temp file creation or write failed
    #[error("failed to stage upload file: {0}")]
    Io(#[from] std::io::Error),

    /// The storage request itself failed (network, auth, bucket, ...)
    #[error("upload failed: {0}")]
    Storage(String),

    /// Background task plumbing failed
    #[error("internal error: {0}")]
    Internal(String),
}
