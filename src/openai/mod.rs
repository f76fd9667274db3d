//! # Assistants API access
//!
//! Typed access to the OpenAI Assistants endpoints the relay needs:
//! - `types`: wire structs for assistants, threads, messages and runs
//! - `client`: the reqwest-backed [`OpenAIClient`]
//! - `error`: [`OpenAIError`], the upstream failure taxonomy
//!
//! The relay only talks to the remote service through [`AssistantsApi`], so
//! the run protocol can be driven by scripted doubles in tests.

pub mod client;
pub mod error;
pub mod types;

pub use client::OpenAIClient;
pub use error::OpenAIError;
pub use types::*;

use async_trait::async_trait;

#[async_trait]
pub trait AssistantsApi: Send + Sync {
    async fn retrieve_assistant(&self, assistant_id: &str) -> error::Result<Assistant>;

    async fn create_thread(&self) -> error::Result<Thread>;

    /// Appends a user-role message to the thread.
    async fn create_message(&self, thread_id: &str, content: &str) -> error::Result<Message>;

    async fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
        model: Option<&str>,
    ) -> error::Result<Run>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> error::Result<Run>;

    /// Messages of the thread, newest first. Implementations may narrow the
    /// listing to `run_id`, callers must still filter.
    async fn list_messages(&self, thread_id: &str, run_id: &str) -> error::Result<Vec<Message>>;
}
