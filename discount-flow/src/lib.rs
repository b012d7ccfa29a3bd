pub mod api;
pub mod config;
pub mod error;
pub mod feedback;
pub mod flow;
pub mod parser;
pub mod render;
pub mod runner;
pub mod session;
pub mod storage;
pub mod token;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use api::{DiscountApi, HttpDiscountApi};
pub use config::ClientConfig;
pub use error::{FlowError, Result};
pub use feedback::{FeedbackForm, FeedbackSubmission, Photo};
pub use flow::ConversationFlow;
pub use parser::{DiscountReply, DiscountResult, format_discount_response, parse_discount_response};
pub use render::Render;
pub use runner::{ChatRunner, Presenter};
pub use session::{PendingFeedback, SessionState, Step};
pub use storage::{FileTokenStore, InMemoryTokenStore, TokenStore};
pub use token::{AuthToken, TokenManager};
pub use validate::{validate_amount, validate_phone};
