use crate::openai::{OpenAIError, RunStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Conversation session is not initialized")]
    NotInitialized,

    #[error("Upstream error: {source}")]
    Upstream {
        #[from]
        source: OpenAIError,
    },

    #[error("NoValidReply: run {run_id} completed without an assistant text message")]
    NoValidReply { run_id: String },

    #[error("Run {run_id} ended with status {status}: {reason}")]
    RunFailed {
        run_id: String,
        status: RunStatus,
        reason: String,
    },

    #[error("Run {run_id} did not complete after {attempts} status checks")]
    Timeout { run_id: String, attempts: u32 },
}

pub type RelayResult<T> = Result<T, RelayError>;
