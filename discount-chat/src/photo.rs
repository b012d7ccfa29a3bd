use std::path::Path;

use discount_flow::{FlowError, Photo, Result, error::MAX_PHOTO_BYTES};
use image::ImageFormat;

const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

/// Content type guessed from the file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or(UNKNOWN_CONTENT_TYPE)
}

/// Reads an image to attach to feedback. The size is checked before reading.
pub async fn load_photo(path: &Path) -> Result<Photo> {
    let content_type = content_type_for(path);
    if !content_type.starts_with("image/") {
        return Err(FlowError::NotAnImage);
    }

    let size = tokio::fs::metadata(path).await?.len() as usize;
    if size > MAX_PHOTO_BYTES {
        return Err(FlowError::PhotoTooLarge { size });
    }

    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());
    Photo::new(file_name, content_type, bytes)
}
