//! Line-oriented presenter for a terminal.

use std::path::Path;

use async_trait::async_trait;
use discount_flow::{FeedbackForm, Presenter, Render, Result};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin, Stdout,
};
use tracing::warn;

use crate::photo::load_photo;

const QUIT_COMMAND: &str = "/quit";

pub struct TerminalPresenter<R, W> {
    lines: Lines<R>,
    out: W,
}

impl TerminalPresenter<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> TerminalPresenter<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    async fn write(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }

    async fn say(&mut self, message: &str) -> Result<()> {
        self.write(&format!("Bot: {}\n", message.replace('\n', "\n     "))).await
    }

    /// Prints `prompt` and reads one line, `None` on end of input.
    async fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        self.write(prompt).await?;
        Ok(self.lines.next_line().await?)
    }
}

#[async_trait]
impl<R, W> Presenter for TerminalPresenter<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn next_input(&mut self) -> Result<Option<String>> {
        match self.ask("You: ").await? {
            Some(line) if line.trim() == QUIT_COMMAND => Ok(None),
            other => Ok(other),
        }
    }

    async fn show(&mut self, render: &Render) -> Result<()> {
        match render {
            Render::Bot(message) => self.say(message).await,
            // The terminal already shows what was typed.
            Render::User(_) => Ok(()),
            Render::RatingPrompt { .. } | Render::RatingForm { .. } => Ok(()),
        }
    }

    async fn ask_rating(&mut self, _phone: &str) -> Result<Option<bool>> {
        self.say("🎉 Task Completed!\nRate your experience?").await?;
        loop {
            let Some(answer) = self.ask("Yes 😊 / No 😞 [y/n]: ").await? else {
                return Ok(None);
            };
            match answer.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(Some(true)),
                "n" | "no" => return Ok(Some(false)),
                _ => continue,
            }
        }
    }

    async fn fill_rating_form(&mut self, _phone: &str) -> Result<Option<FeedbackForm>> {
        self.say("🌟 Rate Your Experience 🌟").await?;

        let Some(stars) = self.ask("Stars (1-5): ").await? else {
            return Ok(None);
        };
        // Anything that is not a number counts as no star picked.
        let rating = stars.trim().parse::<u8>().unwrap_or(0);

        let Some(comment) = self.ask("Your feedback: ").await? else {
            return Ok(None);
        };
        let mut form = FeedbackForm::new(rating, comment.trim());

        let Some(photo_path) = self.ask("📸 Photo path (optional, Enter to skip): ").await? else {
            return Ok(None);
        };
        let photo_path = photo_path.trim();
        if !photo_path.is_empty() {
            match load_photo(Path::new(photo_path)).await {
                Ok(photo) => form = form.with_photo(photo),
                Err(e) => {
                    warn!(error = %e, "Photo not attached");
                    self.say(&format!("⚠️ {e}")).await?;
                }
            }
        }

        Ok(Some(form))
    }
}
