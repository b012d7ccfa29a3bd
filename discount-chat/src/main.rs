mod photo;
mod terminal;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use discount_flow::{
    ChatRunner, ClientConfig, ConversationFlow,
    config::{DEFAULT_BASE_URL, DEFAULT_TOKEN_FILE, DEFAULT_USERNAME},
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::terminal::TerminalPresenter;

#[derive(Parser, Debug)]
#[command(name = "discount-chat", about = "Chat with the loyalty discount service")]
struct Args {
    /// Base URL of the discount service
    #[arg(long, env = "DISCOUNT_API_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Business name used for discount lookups
    #[arg(long, env = "DISCOUNT_USERNAME", default_value = DEFAULT_USERNAME)]
    username: String,

    /// File the authorization token is kept in between runs
    #[arg(long, env = "DISCOUNT_TOKEN_FILE", default_value = DEFAULT_TOKEN_FILE)]
    token_file: PathBuf,

    /// Seconds to wait for a feedback submission
    #[arg(long, env = "FEEDBACK_TIMEOUT_SECS", default_value_t = 10)]
    feedback_timeout_secs: u64,
}

impl Args {
    fn into_config(self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(self.base_url)
            .with_username(self.username)
            .with_token_file(self.token_file)
            .with_feedback_timeout(Duration::from_secs(self.feedback_timeout_secs))
    }
}

/// Initialize tracing based on environment variables.
/// Logs go to stderr so they do not mix with the conversation.
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "discount_chat=warn,discount_flow=warn".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Args::parse().into_config();
    info!(
        base_url = %config.base_url,
        username = %config.username,
        token_file = %config.token_file.display(),
        "Starting discount chat"
    );

    let flow = ConversationFlow::from_config(&config)
        .await
        .context("failed to initialise the conversation")?;

    let mut runner = ChatRunner::new(flow, TerminalPresenter::stdio());
    runner.run().await?;
    Ok(())
}
