/// Persistent log of successful uploads
///
/// The whole point of the tool is cataloguing card photos, so the
/// public URLs coming back from the bucket are worth keeping. The log
/// is a small append-only JSON file in the user's data directory:
/// - Linux: ~/.local/share/cardsnap/uploads.json
/// - macOS: ~/Library/Application Support/cardsnap/uploads.json
/// - Windows: %APPDATA%\cardsnap\uploads.json

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::data::{CaptureSource, UploadReceipt};

/// One successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
    /// Object key inside the bucket
    pub key: String,
    /// Public URL of the uploaded object
    pub url: String,
    /// Whether the image came from the camera or from disk
    pub source: CaptureSource,
    /// When the upload completed
    pub uploaded_at: DateTime<Utc>,
}

/// The on-disk upload log
pub struct UploadHistory {
    path: PathBuf,
    records: Vec<UploadRecord>,
}

impl UploadHistory {
    /// Load the history from the default per-user location.
    /// A missing or unreadable file simply yields an empty history.
    pub fn load_default() -> Self {
        Self::load(Self::default_path())
    }

    /// Path where the history file lives
    fn default_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        path.push("cardsnap");
        path.push("uploads.json");
        path
    }

    /// Load the history from an explicit path
    pub fn load(path: PathBuf) -> Self {
        let records = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(records) => records,
                Err(e) => {
                    eprintln!("⚠️  Upload history unreadable, starting fresh: {}", e);
                    Vec::new()
                }
            },
            // Most commonly: first run, no file yet
            Err(_) => Vec::new(),
        };

        UploadHistory { path, records }
    }

    /// Append a receipt and persist the log.
    /// A failed save is logged but never surfaced — losing a log line
    /// must not disturb the upload flow.
    pub fn record(&mut self, receipt: &UploadReceipt) {
        self.records.push(UploadRecord {
            key: receipt.key.clone(),
            url: receipt.url.clone(),
            source: receipt.source,
            uploaded_at: Utc::now(),
        });

        if let Err(e) = self.save() {
            eprintln!("⚠️  Failed to save upload history: {}", e);
        }
    }

    fn save(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, json)
    }

    /// Number of recorded uploads
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether anything has been uploaded yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, oldest first
    pub fn records(&self) -> &[UploadRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(key: &str) -> UploadReceipt {
        UploadReceipt {
            key: key.to_string(),
            url: format!("https://bucket.example.com/{}", key),
            source: CaptureSource::Camera,
        }
    }

    #[test]
    fn test_missing_file_yields_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let history = UploadHistory::load(dir.path().join("uploads.json"));

        assert!(history.is_empty());
    }

    #[test]
    fn test_corrupt_file_yields_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uploads.json");
        fs::write(&path, "{ definitely not json").unwrap();

        let history = UploadHistory::load(path);
        assert!(history.is_empty());
    }

    #[test]
    fn test_records_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uploads.json");

        let mut history = UploadHistory::load(path.clone());
        history.record(&receipt("test/image_20240101_120000.jpg"));
        history.record(&receipt("test/image_20240101_120001.jpg"));
        assert_eq!(history.len(), 2);

        let reloaded = UploadHistory::load(path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.records()[0].key, "test/image_20240101_120000.jpg");
        assert_eq!(reloaded.records()[1].key, "test/image_20240101_120001.jpg");
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("uploads.json");

        let mut history = UploadHistory::load(path.clone());
        history.record(&receipt("test/image_20240101_120000.jpg"));

        assert!(path.exists());
    }
}
