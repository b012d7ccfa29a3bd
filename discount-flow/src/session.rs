use serde::{Deserialize, Serialize};

/// Position in the phone → amount → done cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Step {
    #[default]
    Phone,
    Amount,
    /// Held only while a transaction is in flight
    Done,
}

/// Rating interaction waiting for the user, tied to the phone it was offered for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingFeedback {
    Prompt { phone: String },
    Form { phone: String },
}

/// Conversation state owned by [`crate::ConversationFlow`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub username: Option<String>,
    pub step: Step,
    pub phone: Option<String>,
    pub feedback_declined_count: u32,
    pub feedback_prompt_count: u32,
    pub pending_feedback: Option<PendingFeedback>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the phone step, forgetting the collected phone.
    /// Feedback counters survive.
    pub fn reset_transaction(&mut self) {
        self.step = Step::Phone;
        self.phone = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_feedback_counters() {
        let mut state = SessionState {
            username: Some("test102".to_string()),
            step: Step::Done,
            phone: Some("9898989898".to_string()),
            feedback_declined_count: 2,
            feedback_prompt_count: 4,
            pending_feedback: None,
        };
        state.reset_transaction();

        assert_eq!(state.step, Step::Phone);
        assert_eq!(state.phone, None);
        assert_eq!(state.feedback_declined_count, 2);
        assert_eq!(state.feedback_prompt_count, 4);
    }
}
