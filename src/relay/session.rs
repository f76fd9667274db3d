//! The conversation handle shared by every request: one assistant, one thread.

use super::error::{RelayError, RelayResult};
use crate::openai::{Assistant, AssistantsApi, Thread};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{error, info, instrument};

pub struct Session {
    assistant: Assistant,
    thread: Thread,
    // Held for a whole turn so concurrent requests never interleave on the thread.
    turn_lock: Mutex<()>,
}

impl Session {
    pub fn new(assistant: Assistant, thread: Thread) -> Self {
        Self {
            assistant,
            thread,
            turn_lock: Mutex::new(()),
        }
    }

    /// Resolves the assistant and opens a fresh thread for it.
    #[instrument(skip(api))]
    pub async fn open(api: &dyn AssistantsApi, assistant_id: &str) -> RelayResult<Self> {
        let assistant = api.retrieve_assistant(assistant_id).await?;
        let thread = api.create_thread().await?;
        info!(
            assistant_id = %assistant.id,
            thread_id = %thread.id,
            "Conversation session opened"
        );
        Ok(Self::new(assistant, thread))
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant.id
    }

    pub fn thread_id(&self) -> &str {
        &self.thread.id
    }

    pub async fn begin_turn(&self) -> MutexGuard<'_, ()> {
        self.turn_lock.lock().await
    }
}

/// Holder for the process-wide session. Empty until initialization succeeds;
/// readers get [`RelayError::NotInitialized`] instead of a panic.
#[derive(Clone, Default)]
pub struct SessionSlot {
    inner: Arc<RwLock<Option<Arc<Session>>>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(Arc::new(session)))),
        }
    }

    /// Opens the session and stores it. On failure the slot stays empty and
    /// the error is logged before being returned.
    pub async fn initialize(&self, api: &dyn AssistantsApi, assistant_id: &str) -> RelayResult<()> {
        match Session::open(api, assistant_id).await {
            Ok(session) => {
                *self.inner.write().await = Some(Arc::new(session));
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error initializing OpenAI session");
                Err(e)
            }
        }
    }

    pub async fn get(&self) -> RelayResult<Arc<Session>> {
        self.inner
            .read()
            .await
            .clone()
            .ok_or(RelayError::NotInitialized)
    }

    pub async fn is_ready(&self) -> bool {
        self.inner.read().await.is_some()
    }
}
