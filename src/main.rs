use iced::widget::{button, column, container, row, text};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::time::Duration;

mod camera;
mod config;
mod state;
mod upload;

use camera::{CameraFeed, FrameSource};
use config::StorageConfig;
use state::data::UploadReceipt;
use state::history::UploadHistory;
use state::machine::{CaptureState, Controller};

/// How often the live viewport refreshes from the camera
const TICK_INTERVAL: Duration = Duration::from_millis(30);

/// Main application state
struct CardSnap {
    /// The capture/upload state machine
    controller: Controller,
    /// Bucket endpoint and credentials, loaded once at process entry
    storage: StorageConfig,
    /// Persistent log of successful uploads
    history: UploadHistory,
    /// Cached viewport handle for the currently displayed bitmap
    viewport: Option<iced::widget::image::Handle>,
    /// Status message to display to the user
    status: String,
    /// True while a send is in flight (at most one upload at a time)
    uploading: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Periodic camera tick (only subscribed while the feed is live)
    Tick,
    /// User clicked the "Send" button
    Send,
    /// Background upload completed
    UploadFinished(Result<UploadReceipt, String>),
    /// User clicked the "Upload Image" button (file picker)
    SelectFile,
    /// User clicked the "Clear" button
    Clear,
}

impl CardSnap {
    /// Create a new instance of the application
    fn new(storage: StorageConfig) -> (Self, Task<Message>) {
        let controller = Controller::new(Box::new(|| {
            CameraFeed::open().map(|feed| Box::new(feed) as Box<dyn FrameSource>)
        }));

        let history = UploadHistory::load_default();
        println!("🃏 cardsnap initialized, {} uploads recorded", history.len());

        let status = match controller.camera_resolution() {
            Some((width, height)) => format!(
                "Ready at {}x{}. {} uploads recorded.",
                width,
                height,
                history.len()
            ),
            None => "Camera Not Found".to_string(),
        };

        (
            CardSnap {
                controller,
                storage,
                history,
                viewport: None,
                status,
                uploading: false,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                self.controller.tick();
                self.refresh_viewport();
                Task::none()
            }

            Message::Send => {
                if self.uploading {
                    self.status = "⏳ An upload is already in progress...".to_string();
                    return Task::none();
                }

                // If the camera is live, freeze the current frame first
                if self.controller.is_live() {
                    self.controller.freeze();
                    self.refresh_viewport();
                }

                let Some(capture) = self.controller.capture_for_upload() else {
                    println!("No image to upload. Turn the camera on or upload an image first.");
                    self.status =
                        "Nothing to upload. Capture a frame or pick an image first.".to_string();
                    return Task::none();
                };

                self.uploading = true;
                self.status = "☁️  Uploading...".to_string();

                let storage = self.storage.clone();
                Task::perform(
                    async move {
                        upload::upload_capture(storage, capture)
                            .await
                            .map_err(|e| e.to_string())
                    },
                    Message::UploadFinished,
                )
            }

            Message::UploadFinished(result) => {
                self.uploading = false;
                match result {
                    Ok(receipt) => {
                        self.history.record(&receipt);
                        self.status = format!("✅ Uploaded: {}", receipt.url);
                    }
                    Err(e) => {
                        // Logged and swallowed: the user may simply retry
                        eprintln!("❌ Error uploading to CDN: {}", e);
                        self.status = "Upload failed, see console. You can retry.".to_string();
                    }
                }
                Task::none()
            }

            Message::SelectFile => {
                // Show the native file picker dialog
                let file = FileDialog::new()
                    .set_title("Select Image")
                    .add_filter("Images", &["png", "jpg", "jpeg"])
                    .pick_file();

                // Cancellation is a no-op
                if let Some(path) = file {
                    match self.controller.load_file(&path) {
                        Ok(()) => {
                            self.status = format!("Loaded {}", path.display());
                        }
                        Err(e) => {
                            eprintln!("⚠️  Could not load {}: {}", path.display(), e);
                            self.status = "Could not load that image.".to_string();
                        }
                    }
                    self.refresh_viewport();
                }

                Task::none()
            }

            Message::Clear => {
                self.controller.clear();
                self.refresh_viewport();

                self.status = match self.controller.state() {
                    CaptureState::CameraLive => "Cleared. Camera live again.".to_string(),
                    _ => "Camera Not Found".to_string(),
                };

                Task::none()
            }
        }
    }

    /// Rebuild the cached viewport handle from the controller's display
    fn refresh_viewport(&mut self) {
        self.viewport = self.controller.display().map(|pixels| {
            iced::widget::image::Handle::from_rgba(
                pixels.width(),
                pixels.height(),
                pixels.as_raw().clone(),
            )
        });
    }

    /// The tick runs only while the camera feed is live; freezing,
    /// loading a file or losing the device stops it deterministically.
    fn subscription(&self) -> Subscription<Message> {
        if self.controller.is_live() {
            iced::time::every(TICK_INTERVAL).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let viewport: Element<Message> = match &self.viewport {
            Some(handle) => iced::widget::image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => {
                let placeholder = match self.controller.state() {
                    CaptureState::CameraUnavailable => "Camera Not Found",
                    _ => "",
                };
                text(placeholder).size(24).into()
            }
        };

        let buttons = row![
            button("Send").on_press(Message::Send).padding(10),
            button("Upload Image").on_press(Message::SelectFile).padding(10),
            button("Clear").on_press(Message::Clear).padding(10),
        ]
        .spacing(20);

        let content = column![
            container(viewport)
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill),
            text(&self.status).size(16),
            buttons,
        ]
        .spacing(20)
        .padding(20)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    // Missing credentials are fatal before any window appears
    let storage = match StorageConfig::from_env() {
        Ok(storage) => storage,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!(
                "Set '{}' and '{}' before running.",
                config::ENV_ACCESS_ID,
                config::ENV_ACCESS_KEY
            );
            std::process::exit(1);
        }
    };

    iced::application("Image Uploader", CardSnap::update, CardSnap::view)
        .subscription(CardSnap::subscription)
        .theme(CardSnap::theme)
        .window_size((800.0, 600.0))
        .centered()
        .run_with(move || CardSnap::new(storage.clone()))
}
