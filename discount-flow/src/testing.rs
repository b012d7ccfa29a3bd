//! Scripted [`DiscountApi`] used by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{
    api::DiscountApi,
    error::{FlowError, Result},
    feedback::FeedbackSubmission,
    token::AuthToken,
};

pub const HAPPY_RESPONSE: &str = "Phone Number: 9898989898\n ; Final Bill Amount: 600.50\n ; Discount Given: 10%\n ; Has Transaction: false";
pub const EXPIRED_RESPONSE: &str = "Not authorized / Token expired.";

/// Discount bodies are served from a queue; once empty, [`HAPPY_RESPONSE`] is returned.
/// `Err(status)` entries become HTTP status errors.
#[derive(Default)]
pub struct ScriptedApi {
    discount_responses: Mutex<VecDeque<std::result::Result<String, u16>>>,
    fail_token_generation: bool,
    feedback_status: Option<u16>,
    token_calls: AtomicUsize,
    discount_calls: AtomicUsize,
    fetched_tokens: Mutex<Vec<String>>,
    submissions: Mutex<Vec<FeedbackSubmission>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_discount_responses(
        self,
        responses: impl IntoIterator<Item = std::result::Result<&'static str, u16>>,
    ) -> Self {
        *self.discount_responses.lock().unwrap() = responses
            .into_iter()
            .map(|r| r.map(str::to_string))
            .collect();
        self
    }

    pub fn failing_token_generation(mut self) -> Self {
        self.fail_token_generation = true;
        self
    }

    pub fn with_feedback_status(mut self, status: u16) -> Self {
        self.feedback_status = Some(status);
        self
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn discount_calls(&self) -> usize {
        self.discount_calls.load(Ordering::SeqCst)
    }

    pub fn fetched_tokens(&self) -> Vec<String> {
        self.fetched_tokens.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<FeedbackSubmission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl DiscountApi for ScriptedApi {
    async fn generate_token(&self, _phone: &str) -> Result<AuthToken> {
        let n = self.token_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_token_generation {
            return Err(FlowError::HttpStatus {
                status: 500,
                body: "token service down".to_string(),
            });
        }
        AuthToken::new(format!("token-{n}")).ok_or(FlowError::MissingToken)
    }

    async fn fetch_discount(
        &self,
        _username: &str,
        _phone: &str,
        _amount: f64,
        token: &AuthToken,
    ) -> Result<String> {
        self.discount_calls.fetch_add(1, Ordering::SeqCst);
        self.fetched_tokens
            .lock()
            .unwrap()
            .push(token.as_str().to_string());
        match self.discount_responses.lock().unwrap().pop_front() {
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => Err(FlowError::HttpStatus {
                status,
                body: "error".to_string(),
            }),
            None => Ok(HAPPY_RESPONSE.to_string()),
        }
    }

    async fn submit_feedback(&self, submission: &FeedbackSubmission) -> Result<()> {
        self.submissions.lock().unwrap().push(submission.clone());
        match self.feedback_status {
            Some(413) => Err(FlowError::PayloadTooLarge),
            Some(status) => Err(FlowError::HttpStatus {
                status,
                body: "boom".to_string(),
            }),
            None => Ok(()),
        }
    }
}
