//! Conversation controller.
//!
//! [`ConversationFlow`] owns the [`SessionState`] and the [`TokenManager`] and
//! is the only thing that mutates them. Every entry point takes `&mut self`,
//! so a second input cannot interleave with one still waiting on the network.
//! Each call returns the [`Render`] instructions the presentation layer should
//! show, in order.

use std::sync::Arc;

use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::{
    api::{DiscountApi, HttpDiscountApi},
    config::ClientConfig,
    error::{FlowError, Result},
    feedback::{FeedbackForm, FeedbackSubmission, MAX_FEEDBACK_DECLINES},
    parser::{is_token_expired, parse_discount_response},
    render::{Render, messages},
    session::{PendingFeedback, SessionState, Step},
    storage::FileTokenStore,
    token::TokenManager,
    validate::{parse_amount, validate_phone},
};

pub struct ConversationFlow {
    state: SessionState,
    tokens: TokenManager,
    api: Arc<dyn DiscountApi>,
    username: String,
}

impl ConversationFlow {
    pub fn new(
        api: Arc<dyn DiscountApi>,
        tokens: TokenManager,
        username: impl Into<String>,
    ) -> Self {
        Self {
            state: SessionState::new(),
            tokens,
            api,
            username: username.into(),
        }
    }

    /// HTTP client plus file-backed token storage, as described by `config`.
    pub async fn from_config(config: &ClientConfig) -> Result<Self> {
        let api = Arc::new(HttpDiscountApi::new(config)?);
        let store = Arc::new(FileTokenStore::new(&config.token_file));
        let tokens = TokenManager::load(store).await?;
        Ok(Self::new(api, tokens, config.username.clone()))
    }

    /// Opening message of a conversation.
    pub fn greeting() -> Render {
        Render::bot(messages::GREETING)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Feeds one line of user text through the current step.
    pub async fn handle_input(&mut self, input: &str) -> Vec<Render> {
        let input = input.trim();
        if input.is_empty() {
            return Vec::new();
        }

        let mut renders = vec![Render::user(input)];
        match self.state.step {
            Step::Phone => self.handle_phone(input, &mut renders),
            Step::Amount => self.handle_amount(input, &mut renders).await,
            Step::Done => {
                // Only reachable if an earlier transaction future was dropped mid-flight.
                warn!("Input arrived while a transaction was marked in flight, restarting");
                self.state.reset_transaction();
                self.handle_phone(input, &mut renders);
            }
        }
        renders
    }

    fn handle_phone(&mut self, input: &str, renders: &mut Vec<Render>) {
        if !validate_phone(input) {
            info!("Rejected phone number input");
            renders.push(Render::bot(messages::INVALID_PHONE));
            return;
        }
        self.state.phone = Some(input.to_string());
        self.state.step = Step::Amount;
        info!(step = ?self.state.step, "Phone number accepted");
        renders.push(Render::bot(messages::ASK_AMOUNT));
    }

    async fn handle_amount(&mut self, input: &str, renders: &mut Vec<Render>) {
        let Some(amount) = parse_amount(input) else {
            info!("Rejected amount input");
            renders.push(Render::bot(messages::INVALID_AMOUNT));
            return;
        };
        let Some(phone) = self.state.phone.clone() else {
            error!("Amount step reached without a phone number");
            self.state.reset_transaction();
            renders.push(Render::bot(messages::DISCOUNT_FAILED));
            return;
        };

        self.state.step = Step::Done;
        self.state.username = Some(self.username.clone());

        let span = info_span!("transaction", transaction_id = %Uuid::new_v4());
        let outcome = self
            .run_transaction(&phone, amount, renders)
            .instrument(span)
            .await;

        match outcome {
            Ok(()) => self.offer_feedback(&phone, renders),
            Err(e) => {
                error!(error = %e, "Discount transaction failed");
                renders.push(Render::bot(messages::DISCOUNT_FAILED));
                self.tokens.invalidate_quietly().await;
            }
        }
        self.state.reset_transaction();
    }

    /// Token, fetch, at most one regenerate-and-retry, then the formatted result.
    async fn run_transaction(
        &mut self,
        phone: &str,
        amount: f64,
        renders: &mut Vec<Render>,
    ) -> Result<()> {
        let token = match self.tokens.current() {
            Some(token) => token.clone(),
            None => {
                renders.push(Render::bot(messages::GENERATING_TOKEN));
                let token = self.tokens.generate(self.api.as_ref(), phone).await?;
                renders.push(Render::bot(messages::TOKEN_GENERATED));
                token
            }
        };

        renders.push(Render::bot(messages::FETCHING_DISCOUNT));
        let mut body = self
            .api
            .fetch_discount(&self.username, phone, amount, &token)
            .await?;

        if is_token_expired(&body) {
            warn!("Token expired, regenerating once");
            renders.push(Render::bot(messages::SESSION_EXPIRED_RETRYING));
            self.tokens.invalidate().await?;
            let token = self.tokens.generate(self.api.as_ref(), phone).await?;
            renders.push(Render::bot(messages::TOKEN_GENERATED));
            body = self
                .api
                .fetch_discount(&self.username, phone, amount, &token)
                .await?;
        }

        let reply = parse_discount_response(&body);
        debug!(reply = ?reply, "Discount received");
        renders.push(Render::Bot(reply.to_message()));
        renders.push(Render::bot(messages::DISCOUNT_APPLIED));
        Ok(())
    }

    fn offer_feedback(&mut self, phone: &str, renders: &mut Vec<Render>) {
        if self.state.feedback_declined_count < MAX_FEEDBACK_DECLINES {
            self.state.feedback_prompt_count += 1;
            self.state.pending_feedback = Some(PendingFeedback::Prompt {
                phone: phone.to_string(),
            });
            renders.push(Render::RatingPrompt {
                phone: phone.to_string(),
            });
        } else {
            info!(
                declined = self.state.feedback_declined_count,
                "Skipping rating prompt"
            );
            renders.push(Render::bot(messages::THANK_YOU));
        }
    }

    /// Answer to the yes/no rating prompt.
    ///
    /// Accepting resets the decline counter, so the decline limit only counts
    /// consecutive declines.
    pub fn respond_to_rating_prompt(&mut self, accept: bool) -> Vec<Render> {
        let phone = match self.state.pending_feedback.take() {
            Some(PendingFeedback::Prompt { phone }) => phone,
            other => {
                self.state.pending_feedback = other;
                warn!("Rating prompt answered with no prompt pending");
                return vec![Render::bot(messages::NO_PENDING_FEEDBACK)];
            }
        };

        if accept {
            info!("Rating prompt accepted");
            self.state.feedback_declined_count = 0;
            self.state.pending_feedback = Some(PendingFeedback::Form {
                phone: phone.clone(),
            });
            vec![Render::RatingForm { phone }]
        } else {
            self.state.feedback_declined_count += 1;
            info!(
                declined = self.state.feedback_declined_count,
                "Rating prompt declined"
            );
            vec![Render::bot(messages::THANK_YOU)]
        }
    }

    /// Sends the filled rating form. The form stays open only when no rating was picked.
    pub async fn submit_feedback(&mut self, form: FeedbackForm) -> Vec<Render> {
        let phone = match &self.state.pending_feedback {
            Some(PendingFeedback::Form { phone }) => phone.clone(),
            _ => {
                warn!("Feedback submitted with no form pending");
                return vec![Render::bot(messages::NO_PENDING_FEEDBACK)];
            }
        };

        if !form.has_valid_rating() {
            return vec![Render::bot(messages::SELECT_RATING)];
        }

        self.state.pending_feedback = None;
        let submission = FeedbackSubmission::from_form(phone, form);
        match self.api.submit_feedback(&submission).await {
            Ok(()) => {
                info!(rating = submission.rating, "Feedback submitted");
                vec![Render::bot(messages::FEEDBACK_THANKS)]
            }
            Err(e) => {
                error!(error = %e, "Feedback submission failed");
                vec![Render::Bot(format!("⚠️ {}", feedback_failure_text(&e)))]
            }
        }
    }
}

fn feedback_failure_text(error: &FlowError) -> String {
    match error {
        FlowError::HttpStatus { status, body } => {
            format!("Failed to submit feedback: {status} - {body}")
        }
        FlowError::Transport(e) if e.is_timeout() => {
            "Failed to submit feedback. Please try again!".to_string()
        }
        other => other.to_string(),
    }
}
