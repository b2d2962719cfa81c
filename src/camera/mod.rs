/// Camera access module
///
/// This module handles:
/// - Opening the default webcam device (feed.rs)
/// - Reading and decoding frames to RGBA bitmaps
/// - Releasing the device when a static image takes over
///
/// The controller talks to the camera through the `FrameSource` trait so
/// the capture/upload state machine can be tested without real hardware.

pub mod feed;

pub use feed::CameraFeed;

use image::RgbaImage;
use thiserror::Error;

/// Camera-related errors. None of these are fatal to the application:
/// an unavailable camera degrades to a placeholder, a failed frame read
/// is skipped.
#[derive(Debug, Error)]
pub enum CameraError {
    /// The device could not be opened or streamed
    #[error("camera unavailable: {0}")]
    Unavailable(String),

    /// A single frame read or decode failed
    #[error("frame read failed: {0}")]
    Frame(String),
}

/// A live source of video frames.
///
/// Contract: after `release()` returns, `is_open()` reports false and
/// `read_frame()` must never be called again.
pub trait FrameSource {
    /// Read and decode one frame
    fn read_frame(&mut self) -> Result<RgbaImage, CameraError>;

    /// Resolution actually granted by the device (may differ from the
    /// requested one)
    fn resolution(&self) -> (u32, u32);

    /// Whether the device is still held
    fn is_open(&self) -> bool;

    /// Stop streaming and release the device
    fn release(&mut self);
}
