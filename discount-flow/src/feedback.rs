//! Types for the post-discount rating sub-flow.

use serde::Serialize;

use crate::error::{FlowError, MAX_PHOTO_BYTES, Result};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Number of declined rating prompts after which no more prompts are shown.
pub const MAX_FEEDBACK_DECLINES: u32 = 3;

/// An image attached to a feedback submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Photo {
    /// Accepts only `image/*` content of at most one megabyte.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        let content_type = content_type.into();
        if !content_type.starts_with("image/") {
            return Err(FlowError::NotAnImage);
        }
        if bytes.len() > MAX_PHOTO_BYTES {
            return Err(FlowError::PhotoTooLarge { size: bytes.len() });
        }
        Ok(Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        })
    }
}

/// What the user filled into the rating form. A rating of 0 means no star was picked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackForm {
    pub rating: u8,
    pub comment: String,
    pub photo: Option<Photo>,
}

impl FeedbackForm {
    pub fn new(rating: u8, comment: impl Into<String>) -> Self {
        Self {
            rating,
            comment: comment.into(),
            photo: None,
        }
    }

    pub fn with_photo(mut self, photo: Photo) -> Self {
        self.photo = Some(photo);
        self
    }

    pub fn has_valid_rating(&self) -> bool {
        (MIN_RATING..=MAX_RATING).contains(&self.rating)
    }
}

/// Payload sent to the feedback endpoint.
///
/// Serializes to the JSON body used when no photo is attached.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedbackSubmission {
    pub phone_number: String,
    pub rating: u8,
    pub comment: String,
    #[serde(skip)]
    pub photo: Option<Photo>,
}

impl FeedbackSubmission {
    pub fn from_form(phone_number: impl Into<String>, form: FeedbackForm) -> Self {
        Self {
            phone_number: phone_number.into(),
            rating: form.rating,
            comment: form.comment,
            photo: form.photo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_must_be_an_image() {
        assert!(matches!(
            Photo::new("notes.txt", "text/plain", vec![1, 2, 3]),
            Err(FlowError::NotAnImage)
        ));
        assert!(Photo::new("cat.png", "image/png", vec![0; 16]).is_ok());
    }

    #[test]
    fn test_photo_size_limit() {
        assert!(Photo::new("big.jpg", "image/jpeg", vec![0; MAX_PHOTO_BYTES]).is_ok());
        let err = Photo::new("big.jpg", "image/jpeg", vec![0; MAX_PHOTO_BYTES + 1]).unwrap_err();
        assert!(matches!(err, FlowError::PhotoTooLarge { size } if size == MAX_PHOTO_BYTES + 1));
    }

    #[test]
    fn test_rating_bounds() {
        assert!(!FeedbackForm::new(0, "").has_valid_rating());
        assert!(FeedbackForm::new(1, "").has_valid_rating());
        assert!(FeedbackForm::new(5, "").has_valid_rating());
        assert!(!FeedbackForm::new(6, "").has_valid_rating());
    }

    #[test]
    fn test_json_body_omits_photo() {
        let photo = Photo::new("cat.png", "image/png", vec![1]).unwrap();
        let submission = FeedbackSubmission::from_form(
            "9898989898",
            FeedbackForm::new(4, "great").with_photo(photo),
        );
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"phone_number": "9898989898", "rating": 4, "comment": "great"})
        );
    }
}
