/// Shared data structures for the application state
///
/// These structs represent the data model that flows between the
/// controller, the upload path and the UI layer.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Where an upload candidate came from.
///
/// The source decides the staging format: camera frames are staged as
/// lossless PNG (they were never JPEG-compressed, no point introducing
/// artifacts), loaded files as quality-95 JPEG (already compressed
/// once, keep the upload reasonably sized).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureSource {
    /// Frozen webcam frame
    Camera,
    /// Image file picked from disk
    File,
}

/// The bitmap designated as the upload candidate.
///
/// At most one exists at a time: set by the send action (frozen frame)
/// or the file picker, cleared by the clear action.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    /// Decoded pixels, the same bitmap the viewport shows
    pub pixels: RgbaImage,
    /// Origin of the pixels (decides the staging format)
    pub source: CaptureSource,
}

/// Result of a successful upload
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// Object key inside the bucket, e.g. "test/image_20240101_120000.jpg"
    pub key: String,
    /// Public URL of the uploaded object
    pub url: String,
    /// What was uploaded
    pub source: CaptureSource,
}
