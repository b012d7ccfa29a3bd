use serde::{Deserialize, Serialize};

/// One instruction for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Render {
    /// A message from the bot
    Bot(String),
    /// Echo of what the user typed
    User(String),
    /// Ask whether the user wants to rate the service
    RatingPrompt { phone: String },
    /// Show the star rating form
    RatingForm { phone: String },
}

impl Render {
    pub fn bot(message: impl Into<String>) -> Self {
        Render::Bot(message.into())
    }

    pub fn user(message: impl Into<String>) -> Self {
        Render::User(message.into())
    }

    /// Text of a `Bot` message, if this is one.
    pub fn bot_text(&self) -> Option<&str> {
        match self {
            Render::Bot(message) => Some(message),
            _ => None,
        }
    }
}

pub mod messages {
    pub const GREETING: &str =
        "Hey! I'm TheLoyalGame chatbot!\n📞 Please enter your phone number (e.g., 9898989898)";
    pub const INVALID_PHONE: &str =
        "⚠️ Please enter a valid 10-digit phone number (e.g., 9898989898)";
    pub const ASK_AMOUNT: &str = "📏 Please enter the bill amount (e.g., 600.50)";
    pub const INVALID_AMOUNT: &str = "⚠️ Please enter a valid amount (e.g., 600.50)";
    pub const GENERATING_TOKEN: &str = "🔑 Generating a new token...";
    pub const TOKEN_GENERATED: &str = "✅ New token generated successfully!";
    pub const FETCHING_DISCOUNT: &str = "⏳ Fetching your discount...";
    pub const SESSION_EXPIRED_RETRYING: &str =
        "⚠️ Your session has expired. Generating a new token...";
    pub const DISCOUNT_APPLIED: &str = "✅ Discount applied successfully!";
    pub const DISCOUNT_FAILED: &str = "⚠️ Failed to get discount. Please try again!";
    pub const THANK_YOU: &str = "Thank you for using our service! 😊";
    pub const SELECT_RATING: &str = "⚠️ Please select a rating!";
    pub const FEEDBACK_THANKS: &str = "✅ Thank you for your feedback! 🎉";
    pub const NO_PENDING_FEEDBACK: &str = "⚠️ Failed to show rating form. Please try again!";
}
