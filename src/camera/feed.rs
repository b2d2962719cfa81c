/// Webcam feed built on nokhwa
///
/// Opens the default device (index 0), asks for Full HD and accepts
/// whatever format the hardware actually grants. Frames are decoded to
/// RGBA so they can go straight into the viewport widget.

use image::{DynamicImage, RgbaImage};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;

use super::{CameraError, FrameSource};

/// Resolution requested from the device (the device may grant less)
const REQUESTED_RESOLUTION: (u32, u32) = (1920, 1080);

/// Frame rate requested alongside the resolution
const REQUESTED_FPS: u32 = 30;

/// Handle to the active camera device
pub struct CameraFeed {
    camera: Camera,
    open: bool,
}

impl CameraFeed {
    /// Open the default camera device and start streaming.
    ///
    /// Returns an error when no device is present or the stream cannot
    /// be started — callers treat that as "camera unavailable", not as
    /// a fatal condition.
    pub fn open() -> Result<Self, CameraError> {
        let (width, height) = REQUESTED_RESOLUTION;
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(width, height),
                FrameFormat::MJPEG,
                REQUESTED_FPS,
            ),
        ));

        let mut camera = Camera::new(CameraIndex::Index(0), requested)
            .map_err(|e| CameraError::Unavailable(e.to_string()))?;

        camera
            .open_stream()
            .map_err(|e| CameraError::Unavailable(e.to_string()))?;

        let granted = camera.resolution();
        println!("📷 Camera resolution: {}x{}", granted.width(), granted.height());

        Ok(CameraFeed { camera, open: true })
    }
}

impl FrameSource for CameraFeed {
    fn read_frame(&mut self) -> Result<RgbaImage, CameraError> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CameraError::Frame(e.to_string()))?;

        let rgb = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::Frame(e.to_string()))?;

        Ok(DynamicImage::ImageRgb8(rgb).to_rgba8())
    }

    fn resolution(&self) -> (u32, u32) {
        let res = self.camera.resolution();
        (res.width(), res.height())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn release(&mut self) {
        if self.open {
            if let Err(e) = self.camera.stop_stream() {
                eprintln!("⚠️  Failed to stop camera stream: {}", e);
            }
            self.open = false;
        }
    }
}

impl Drop for CameraFeed {
    /// Window close releases the device even if no one called `release`
    fn drop(&mut self) {
        self.release();
    }
}
