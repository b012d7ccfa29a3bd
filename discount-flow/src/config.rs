use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3030";
pub const DEFAULT_USERNAME: &str = "test102";
pub const DEFAULT_TOKEN_FILE: &str = ".discount-chat-token.json";
pub const DEFAULT_FEEDBACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings shared by the API client and the conversation flow.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme, host and port of the discount service.
    pub base_url: String,
    /// Business name sent as the first path segment of discount lookups.
    pub username: String,
    /// Where the authorization token is persisted between runs.
    pub token_file: PathBuf,
    pub feedback_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            feedback_timeout: DEFAULT_FEEDBACK_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_token_file(mut self, token_file: impl Into<PathBuf>) -> Self {
        self.token_file = token_file.into();
        self
    }

    pub fn with_feedback_timeout(mut self, timeout: Duration) -> Self {
        self.feedback_timeout = timeout;
        self
    }
}
