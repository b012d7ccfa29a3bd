use thiserror::Error;

/// Largest photo accepted with a feedback submission, in bytes.
pub const MAX_PHOTO_BYTES: usize = 1024 * 1024;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error! status: {status} - {body}")]
    HttpStatus { status: u16, body: String },

    #[error("File size too large. Please upload a smaller image (max 1 MB).")]
    PayloadTooLarge,

    #[error("Token not found in response")]
    MissingToken,

    #[error("Please upload an image file!")]
    NotAnImage,

    #[error("Image size ({:.2} MB) exceeds 1 MB limit!", megabytes(.size))]
    PhotoTooLarge { size: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

fn megabytes(bytes: &usize) -> f64 {
    *bytes as f64 / MAX_PHOTO_BYTES as f64
}

pub type Result<T> = std::result::Result<T, FlowError>;
