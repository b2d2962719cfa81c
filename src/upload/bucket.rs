/// Staging and PutObject logic for the CDN bucket
///
/// The wire interface is fixed: keys look like
/// `test/image_<YYYYMMDD_HHMMSS>.jpg`, objects are public-read, and the
/// public URL is `https://<bucket>.<endpoint-host>/<key>`. The key
/// keeps its `.jpg` extension even for PNG-staged camera captures —
/// downstream consumers of the CDN expect that shape.

use std::io::Write;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use chrono::{DateTime, Local};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::DynamicImage;
use tempfile::NamedTempFile;

use crate::config::{StorageConfig, KEY_PREFIX};
use crate::state::data::{CaptureSource, CapturedImage, UploadReceipt};

use super::UploadError;

/// JPEG quality for staging loaded files
const JPEG_QUALITY: u8 = 95;

/// Build the object key for an upload happening at `at`.
///
/// Second-resolution local timestamp, fixed prefix and extension.
pub fn object_key(at: DateTime<Local>) -> String {
    format!("{}/image_{}.jpg", KEY_PREFIX, at.format("%Y%m%d_%H%M%S"))
}

/// Public URL the bucket serves `key` under once the object is
/// public-read.
pub fn public_url(config: &StorageConfig, key: &str) -> String {
    format!("https://{}.{}/{}", config.bucket, config.endpoint_host(), key)
}

/// Serialize the upload candidate into a uniquely named temporary file.
///
/// Camera captures are staged as lossless PNG, loaded files as
/// quality-95 JPEG. The returned guard deletes the file when dropped,
/// so every exit path of the upload cleans up after itself. Unique
/// names mean two rapid sends can never clobber each other's staging
/// file.
fn stage_capture(capture: &CapturedImage) -> Result<NamedTempFile, UploadError> {
    let suffix = match capture.source {
        CaptureSource::Camera => ".png",
        CaptureSource::File => ".jpg",
    };

    let mut file = tempfile::Builder::new()
        .prefix("cardsnap_upload_")
        .suffix(suffix)
        .tempfile()?;

    match capture.source {
        CaptureSource::Camera => {
            let encoder = PngEncoder::new(&mut file);
            capture.pixels.write_with_encoder(encoder)?;
        }
        CaptureSource::File => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgba8(capture.pixels.clone()).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut file, JPEG_QUALITY);
            encoder.encode_image(&rgb)?;
        }
    }

    file.flush()?;
    Ok(file)
}

/// Construct the storage client from the configuration loaded at
/// process entry.
fn build_client(config: &StorageConfig) -> Client {
    let credentials = Credentials::new(
        &config.access_key_id,
        &config.secret_access_key,
        None,
        None,
        "cardsnap-env",
    );

    let s3_config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .endpoint_url(&config.endpoint)
        .credentials_provider(credentials)
        .build();

    Client::from_conf(s3_config)
}

/// Upload the candidate and return its public URL.
///
/// Performs exactly one PutObject with public-read ACL. The staging
/// file is removed on success, error and early return alike.
pub async fn upload_capture(
    config: StorageConfig,
    capture: CapturedImage,
) -> Result<UploadReceipt, UploadError> {
    let source = capture.source;

    // Encoding a Full HD bitmap is CPU work, keep it off the reactor
    let staged = tokio::task::spawn_blocking(move || stage_capture(&capture))
        .await
        .map_err(|e| UploadError::Internal(format!("staging task failed: {}", e)))??;

    let key = object_key(Local::now());
    let url = public_url(&config, &key);

    let content_type = match source {
        CaptureSource::Camera => "image/png",
        CaptureSource::File => "image/jpeg",
    };

    let body = ByteStream::from_path(staged.path())
        .await
        .map_err(|e| UploadError::Storage(e.to_string()))?;

    let client = build_client(&config);
    client
        .put_object()
        .bucket(&config.bucket)
        .key(&key)
        .acl(ObjectCannedAcl::PublicRead)
        .content_type(content_type)
        .body(body)
        .send()
        .await
        .map_err(|e| UploadError::Storage(DisplayErrorContext(e).to_string()))?;

    println!("✅ Image uploaded successfully as {}", key);

    Ok(UploadReceipt { key, url, source })
    // `staged` drops here: temp file removed whether we got this far or
    // bailed out through any `?` above
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image::RgbaImage;

    fn test_config() -> StorageConfig {
        StorageConfig::from_lookup(|name| match name {
            crate::config::ENV_ACCESS_ID => Some("id".to_string()),
            crate::config::ENV_ACCESS_KEY => Some("key".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn capture(source: CaptureSource) -> CapturedImage {
        CapturedImage {
            pixels: RgbaImage::from_pixel(8, 8, image::Rgba([120, 30, 200, 255])),
            source,
        }
    }

    #[test]
    fn test_object_key_format() {
        let at = Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(object_key(at), "test/image_20240101_120000.jpg");
    }

    #[test]
    fn test_object_key_pads_components() {
        let at = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(object_key(at), "test/image_20240307_090502.jpg");
    }

    #[test]
    fn test_object_keys_are_monotonic() {
        // Lexicographic order matches chronological order for this
        // timestamp shape
        let earlier = object_key(Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
        let later = object_key(Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 1).unwrap());
        assert!(earlier < later);

        let now = object_key(Local::now());
        let again = object_key(Local::now());
        assert!(now <= again);
    }

    #[test]
    fn test_public_url_templating() {
        let config = test_config();
        let url = public_url(&config, "test/image_20240101_120000.jpg");
        assert_eq!(
            url,
            "https://divinetradingcardllccdn.nyc3.digitaloceanspaces.com/test/image_20240101_120000.jpg"
        );
    }

    #[test]
    fn test_camera_capture_stages_as_png() {
        let staged = stage_capture(&capture(CaptureSource::Camera)).unwrap();
        let bytes = std::fs::read(staged.path()).unwrap();

        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_loaded_file_stages_as_jpeg() {
        let staged = stage_capture(&capture(CaptureSource::File)).unwrap();
        let bytes = std::fs::read(staged.path()).unwrap();

        assert_eq!(&bytes[..2], [0xFF, 0xD8]);
    }

    #[test]
    fn test_staging_file_is_removed_on_drop() {
        let staged = stage_capture(&capture(CaptureSource::Camera)).unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn test_concurrent_stagings_use_distinct_paths() {
        let a = stage_capture(&capture(CaptureSource::Camera)).unwrap();
        let b = stage_capture(&capture(CaptureSource::Camera)).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_staged_jpeg_decodes_back() {
        let staged = stage_capture(&capture(CaptureSource::File)).unwrap();
        let decoded = image::open(staged.path()).unwrap().to_rgb8();

        assert_eq!(decoded.dimensions(), (8, 8));
        // Quality 95 keeps the solid color close to the original
        let pixel = decoded.get_pixel(4, 4).0;
        assert!((pixel[0] as i16 - 120).abs() < 10);
        assert!((pixel[2] as i16 - 200).abs() < 10);
    }
}
