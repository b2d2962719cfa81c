/// The capture/upload state machine
///
/// One controller owns the camera handle, the bitmap currently on
/// screen and the bitmap designated for upload. Every user action maps
/// to exactly one method here; the UI layer only wires buttons and the
/// tick timer to these methods and renders whatever `display()` holds.

use std::path::Path;

use image::RgbaImage;

use crate::camera::{CameraError, FrameSource};
use super::data::{CaptureSource, CapturedImage};

/// Factory that attempts to open the camera device.
///
/// Injected so the machine can be driven by a fake source in tests and
/// so a clear action can re-run the exact same open attempt.
pub type CameraOpener = Box<dyn Fn() -> Result<Box<dyn FrameSource>, CameraError>>;

/// The three observable states of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Camera open, tick running, viewport shows the live feed
    CameraLive,
    /// No device available; placeholder shown until a file is picked
    /// or a clear action retries the open
    CameraUnavailable,
    /// A frozen frame or loaded file is on screen; camera released
    StaticImageLoaded,
}

/// Owns the camera session, the displayed bitmap and the upload candidate
pub struct Controller {
    opener: CameraOpener,
    camera: Option<Box<dyn FrameSource>>,
    display: Option<RgbaImage>,
    captured: Option<CapturedImage>,
}

impl Controller {
    /// Create the controller and run the initial camera-open attempt.
    ///
    /// Post: state is `CameraLive` on success, `CameraUnavailable` if
    /// no device could be opened.
    pub fn new(opener: CameraOpener) -> Self {
        let mut controller = Controller {
            opener,
            camera: None,
            display: None,
            captured: None,
        };
        controller.open_camera();
        controller
    }

    /// Attempt to open the camera. Failure is non-fatal: the controller
    /// degrades to `CameraUnavailable` and logs the reason.
    fn open_camera(&mut self) {
        match (self.opener)() {
            Ok(camera) => self.camera = Some(camera),
            Err(e) => {
                eprintln!("⚠️  {}", e);
                self.camera = None;
            }
        }
    }

    /// Current state, derived from what the controller holds
    pub fn state(&self) -> CaptureState {
        if self.captured.is_some() {
            CaptureState::StaticImageLoaded
        } else if self.camera.is_some() {
            CaptureState::CameraLive
        } else {
            CaptureState::CameraUnavailable
        }
    }

    /// Whether the periodic tick should be running
    pub fn is_live(&self) -> bool {
        self.state() == CaptureState::CameraLive
    }

    /// The bitmap the viewport should show, if any
    pub fn display(&self) -> Option<&RgbaImage> {
        self.display.as_ref()
    }

    /// One timer tick: read a frame and refresh the display.
    ///
    /// Pre: any state (no-op unless `CameraLive`).
    /// Post: on a successful read the display holds the new frame; a
    /// failed read is skipped silently (best-effort policy) and the
    /// last good frame stays on screen. The upload candidate is never
    /// touched by a tick.
    pub fn tick(&mut self) {
        let Some(camera) = self.camera.as_mut() else {
            return;
        };
        if let Ok(frame) = camera.read_frame() {
            self.display = Some(frame);
        }
    }

    /// Load an image file as both the displayed bitmap and the upload
    /// candidate.
    ///
    /// Pre: any state. Post: `StaticImageLoaded`, camera released, tick
    /// stopped. On a decode error nothing changes.
    pub fn load_file(&mut self, path: &Path) -> Result<(), image::ImageError> {
        let pixels = image::open(path)?.to_rgba8();

        self.release_camera();
        self.display = Some(pixels.clone());
        self.captured = Some(CapturedImage {
            pixels,
            source: CaptureSource::File,
        });

        Ok(())
    }

    /// Freeze the currently displayed live frame as the upload candidate.
    ///
    /// Pre: `CameraLive` with at least one frame shown — otherwise this
    /// returns false and nothing changes. Post: `StaticImageLoaded`,
    /// camera released, tick stopped.
    pub fn freeze(&mut self) -> bool {
        if self.camera.is_none() {
            return false;
        }
        let Some(frame) = self.display.clone() else {
            return false;
        };

        self.captured = Some(CapturedImage {
            pixels: frame,
            source: CaptureSource::Camera,
        });
        self.release_camera();
        true
    }

    /// The current upload candidate, cloned for handing to a background
    /// upload task. `None` means there is nothing to upload.
    pub fn capture_for_upload(&self) -> Option<CapturedImage> {
        self.captured.clone()
    }

    /// Clear action: discard the upload candidate, clear the viewport
    /// and re-run the camera-open attempt.
    ///
    /// Post: `CameraLive` if a device is present, `CameraUnavailable`
    /// otherwise.
    pub fn clear(&mut self) {
        self.captured = None;
        self.display = None;
        self.release_camera();
        self.open_camera();
    }

    /// Window close: release the camera handle if held.
    pub fn shutdown(&mut self) {
        self.release_camera();
    }

    /// Resolution granted by the device, if the camera is held
    pub fn camera_resolution(&self) -> Option<(u32, u32)> {
        self.camera.as_ref().map(|camera| camera.resolution())
    }

    fn release_camera(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if camera.is_open() {
                camera.release();
            }
        }
    }
}
