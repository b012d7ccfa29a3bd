//! Client side of the discount service.
//!
//! Endpoints:
//! - `GET /generate_token?phone=..` returns `{"token": ".."}`
//! - `GET /get_discount/{username}/phone_number_amount/{phone},{amount}/token/{token}`
//!   returns the delimited text decoded by [`crate::parser`]
//! - `POST /submit_feedback` takes JSON, or multipart when a photo is attached
//!
//! Only feedback submission carries an explicit timeout; the other two calls
//! rely on the transport defaults.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    StatusCode, Url,
    header::ACCEPT,
    multipart::{Form, Part},
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    config::ClientConfig,
    error::{FlowError, Result},
    feedback::FeedbackSubmission,
    token::AuthToken,
};

/// Remote operations the conversation depends on.
#[async_trait]
pub trait DiscountApi: Send + Sync {
    async fn generate_token(&self, phone: &str) -> Result<AuthToken>;

    /// Returns the raw response body. Non-success statuses are errors.
    async fn fetch_discount(
        &self,
        username: &str,
        phone: &str,
        amount: f64,
        token: &AuthToken,
    ) -> Result<String>;

    async fn submit_feedback(&self, submission: &FeedbackSubmission) -> Result<()>;
}

#[derive(Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

/// [`DiscountApi`] over HTTP.
#[derive(Clone)]
pub struct HttpDiscountApi {
    client: reqwest::Client,
    base_url: Url,
    feedback_timeout: Duration,
}

impl HttpDiscountApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FlowError::InvalidConfig(format!("base url {}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(FlowError::InvalidConfig(format!(
                "base url {} cannot carry a path",
                config.base_url
            )));
        }
        Ok(Self {
            client,
            base_url,
            feedback_timeout: config.feedback_timeout,
        })
    }

    /// Appends percent-encoded path segments to the base url.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn discount_url(&self, username: &str, phone: &str, amount: f64, token: &AuthToken) -> Url {
        let phone_amount = format!("{phone},{amount}");
        self.endpoint([
            "get_discount",
            username,
            "phone_number_amount",
            phone_amount.as_str(),
            "token",
            token.as_str(),
        ])
    }

    pub fn token_url(&self, phone: &str) -> Url {
        let mut url = self.endpoint(["generate_token"]);
        url.query_pairs_mut().append_pair("phone", phone);
        url
    }

    fn multipart_form(submission: &FeedbackSubmission) -> Result<Form> {
        let mut form = Form::new()
            .text("phone_number", submission.phone_number.clone())
            .text("rating", submission.rating.to_string())
            .text("comment", submission.comment.clone());
        if let Some(photo) = &submission.photo {
            let part = Part::bytes(photo.bytes.clone())
                .file_name(photo.file_name.clone())
                .mime_str(&photo.content_type)?;
            form = form.part("photo", part);
        }
        Ok(form)
    }
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(FlowError::HttpStatus {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl DiscountApi for HttpDiscountApi {
    async fn generate_token(&self, phone: &str) -> Result<AuthToken> {
        let url = self.token_url(phone);
        info!("Requesting new token");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let response = error_for_status(response).await?;

        let body: TokenResponse = response.json().await?;
        body.token
            .and_then(AuthToken::new)
            .ok_or(FlowError::MissingToken)
    }

    async fn fetch_discount(
        &self,
        username: &str,
        phone: &str,
        amount: f64,
        token: &AuthToken,
    ) -> Result<String> {
        let url = self.discount_url(username, phone, amount, token);
        info!(username = %username, amount = %amount, "Fetching discount");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/plain")
            .send()
            .await?;
        let response = error_for_status(response).await?;
        let body = response.text().await?;
        debug!(body = %body, "Discount response");
        Ok(body)
    }

    async fn submit_feedback(&self, submission: &FeedbackSubmission) -> Result<()> {
        let url = self.endpoint(["submit_feedback"]);
        info!(
            rating = submission.rating,
            has_photo = submission.photo.is_some(),
            "Submitting feedback"
        );

        let request = self.client.post(url).timeout(self.feedback_timeout);
        let request = if submission.photo.is_some() {
            request.multipart(Self::multipart_form(submission)?)
        } else {
            request.json(submission)
        };

        let response = request.send().await?;
        if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
            warn!("Feedback rejected as too large");
            return Err(FlowError::PayloadTooLarge);
        }
        error_for_status(response).await?;
        Ok(())
    }
}
