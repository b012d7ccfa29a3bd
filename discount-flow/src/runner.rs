//! ChatRunner – drives a [`ConversationFlow`] through a [`Presenter`].
//!
//! The flow only returns [`Render`] instructions. The runner walks them in
//! order, hands plain messages to the presenter, and turns the two interactive
//! renders (rating prompt and rating form) into questions for the presenter,
//! feeding the answers back into the flow.
//!
//! ```rust,ignore
//! let flow = ConversationFlow::from_config(&config).await?;
//! let mut runner = ChatRunner::new(flow, TerminalPresenter::stdio());
//! runner.run().await?;
//! ```

use std::collections::VecDeque;

use async_trait::async_trait;
use tracing::info;

use crate::{
    error::Result,
    feedback::FeedbackForm,
    flow::ConversationFlow,
    render::Render,
    session::PendingFeedback,
};

/// The display side of the chat.
#[async_trait]
pub trait Presenter: Send {
    /// Next line typed by the user, `None` when input is closed.
    async fn next_input(&mut self) -> Result<Option<String>>;

    /// Display a non-interactive render.
    async fn show(&mut self, render: &Render) -> Result<()>;

    /// Yes/no answer to the rating prompt, `None` to leave it unanswered.
    async fn ask_rating(&mut self, phone: &str) -> Result<Option<bool>>;

    /// The filled rating form, `None` to abandon it.
    async fn fill_rating_form(&mut self, phone: &str) -> Result<Option<FeedbackForm>>;
}

pub struct ChatRunner<P> {
    flow: ConversationFlow,
    presenter: P,
}

impl<P: Presenter> ChatRunner<P> {
    pub fn new(flow: ConversationFlow, presenter: P) -> Self {
        Self { flow, presenter }
    }

    pub fn flow(&self) -> &ConversationFlow {
        &self.flow
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Greets, then processes input until the presenter runs out of it.
    pub async fn run(&mut self) -> Result<()> {
        self.presenter.show(&ConversationFlow::greeting()).await?;
        while let Some(line) = self.presenter.next_input().await? {
            self.submit(&line).await?;
        }
        info!("Input closed, leaving chat");
        Ok(())
    }

    /// Handles one line of input and every interaction it triggers.
    pub async fn submit(&mut self, input: &str) -> Result<()> {
        let renders = self.flow.handle_input(input).await;
        self.present(renders).await
    }

    async fn present(&mut self, renders: Vec<Render>) -> Result<()> {
        let mut queue = VecDeque::from(renders);
        while let Some(render) = queue.pop_front() {
            match &render {
                Render::RatingPrompt { phone } => {
                    if let Some(accept) = self.presenter.ask_rating(phone).await? {
                        queue.extend(self.flow.respond_to_rating_prompt(accept));
                    }
                }
                Render::RatingForm { phone } => {
                    let follow_up = self.collect_feedback(phone).await?;
                    queue.extend(follow_up);
                }
                _ => self.presenter.show(&render).await?,
            }
        }
        Ok(())
    }

    /// Re-asks for the form for as long as the flow keeps it open.
    async fn collect_feedback(&mut self, phone: &str) -> Result<Vec<Render>> {
        loop {
            let Some(form) = self.presenter.fill_rating_form(phone).await? else {
                return Ok(Vec::new());
            };
            let renders = self.flow.submit_feedback(form).await;
            let still_open = matches!(
                self.flow.state().pending_feedback,
                Some(PendingFeedback::Form { .. })
            );
            if !still_open {
                return Ok(renders);
            }
            for render in &renders {
                self.presenter.show(render).await?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::messages;
    use crate::storage::InMemoryTokenStore;
    use crate::testing::ScriptedApi;
    use crate::token::TokenManager;
    use std::sync::Arc;

    #[derive(Default)]
    struct ScriptedPresenter {
        inputs: VecDeque<String>,
        ratings: VecDeque<bool>,
        forms: VecDeque<FeedbackForm>,
        shown: Vec<Render>,
        prompts: usize,
    }

    #[async_trait]
    impl Presenter for ScriptedPresenter {
        async fn next_input(&mut self) -> Result<Option<String>> {
            Ok(self.inputs.pop_front())
        }

        async fn show(&mut self, render: &Render) -> Result<()> {
            self.shown.push(render.clone());
            Ok(())
        }

        async fn ask_rating(&mut self, _phone: &str) -> Result<Option<bool>> {
            self.prompts += 1;
            Ok(self.ratings.pop_front())
        }

        async fn fill_rating_form(&mut self, _phone: &str) -> Result<Option<FeedbackForm>> {
            Ok(self.forms.pop_front())
        }
    }

    async fn runner(
        api: Arc<ScriptedApi>,
        presenter: ScriptedPresenter,
    ) -> ChatRunner<ScriptedPresenter> {
        let tokens = TokenManager::load(Arc::new(InMemoryTokenStore::new()))
            .await
            .unwrap();
        ChatRunner::new(ConversationFlow::new(api, tokens, "test102"), presenter)
    }

    fn shown_texts(presenter: &ScriptedPresenter) -> Vec<&str> {
        presenter.shown.iter().filter_map(Render::bot_text).collect()
    }

    #[tokio::test]
    async fn test_full_conversation_with_feedback() {
        let api = Arc::new(ScriptedApi::new());
        let presenter = ScriptedPresenter {
            inputs: ["9898989898", "600.50"].map(String::from).into(),
            ratings: [true].into(),
            forms: [FeedbackForm::new(0, ""), FeedbackForm::new(4, "nice")].into(),
            ..Default::default()
        };
        let mut runner = runner(api.clone(), presenter).await;

        runner.run().await.unwrap();

        let texts = shown_texts(runner.presenter());
        assert_eq!(texts.first(), Some(&messages::GREETING));
        assert!(texts.contains(&messages::SELECT_RATING));
        assert_eq!(texts.last(), Some(&messages::FEEDBACK_THANKS));
        assert_eq!(api.submissions().len(), 1);
        assert_eq!(api.submissions()[0].rating, 4);
        assert_eq!(runner.flow().state().pending_feedback, None);
    }

    #[tokio::test]
    async fn test_declined_prompt_thanks_user() {
        let api = Arc::new(ScriptedApi::new());
        let presenter = ScriptedPresenter {
            inputs: ["9898989898", "600.50"].map(String::from).into(),
            ratings: [false].into(),
            ..Default::default()
        };
        let mut runner = runner(api.clone(), presenter).await;

        runner.run().await.unwrap();

        assert_eq!(runner.presenter().prompts, 1);
        assert_eq!(shown_texts(runner.presenter()).last(), Some(&messages::THANK_YOU));
        assert_eq!(runner.flow().state().feedback_declined_count, 1);
        assert!(api.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_user_input_is_echoed() {
        let api = Arc::new(ScriptedApi::new());
        let mut runner = runner(api, ScriptedPresenter::default()).await;

        runner.submit("hello").await.unwrap();

        assert_eq!(
            runner.presenter().shown,
            vec![Render::user("hello"), Render::bot(messages::INVALID_PHONE)]
        );
    }
}
