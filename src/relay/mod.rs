//! # Run-completion relay
//!
//! One conversational turn against the shared session:
//!
//! ```text
//! user text → submit (append message, start run) → poller (wait for terminal status)
//!           → extract (pick this run's assistant message) → reply text
//! ```
//!
//! The three stages always run in that order and the whole turn holds the
//! session's turn lock, so replies can't cross between concurrent callers.

pub mod error;
pub mod extract;
pub mod poller;
pub mod session;
pub mod submit;

pub use error::{RelayError, RelayResult};
pub use poller::RunState;
pub use session::{Session, SessionSlot};

use crate::config::PollConfig;
use crate::openai::AssistantsApi;
use std::sync::Arc;
use tracing::instrument;

#[derive(Clone)]
pub struct Relay {
    api: Arc<dyn AssistantsApi>,
    poll: PollConfig,
    model: Option<String>,
}

impl Relay {
    pub fn new(api: Arc<dyn AssistantsApi>, poll: PollConfig, model: Option<String>) -> Self {
        Self { api, poll, model }
    }

    fn api(&self) -> &dyn AssistantsApi {
        self.api.as_ref()
    }

    /// Runs a full turn and returns the assistant's reply text.
    #[instrument(skip(self, session, input), fields(thread_id = %session.thread_id()))]
    pub async fn run_turn(&self, session: &Session, input: &str) -> RelayResult<String> {
        let _turn = session.begin_turn().await;

        let run = submit::submit_turn(self.api(), session, input, self.model.as_deref()).await?;
        let run = poller::wait_for_completion(self.api(), session.thread_id(), &run.id, &self.poll)
            .await?;
        extract::extract_reply(self.api(), session.thread_id(), &run.id).await
    }
}
